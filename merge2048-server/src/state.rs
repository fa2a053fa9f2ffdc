//! Server state management
//!
//! One shared game plus the optional save slot it is persisted to.
//!
//! Handlers take a `PendingSave` while they hold the game lock and write it
//! after releasing the lock, on the blocking pool. Saves carry a generation
//! number so a slow writer never replaces a newer save with an older one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Context;
use merge2048_core::{Game, GameStatus, SaveFile, Snapshot};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::Mutex;

use crate::ServerConfig;

/// Server-wide shared state
pub struct ServerState {
    game: RwLock<Game>,
    save: Option<SaveSlot>,
}

struct SaveSlot {
    file: SaveFile,
    /// Last generation handed out, bumped under the game lock
    issued: AtomicU64,
    /// Last generation written to disk
    written: Mutex<u64>,
}

/// Game state captured for the save slot
pub struct PendingSave {
    generation: u64,
    snapshot: Snapshot,
    status: GameStatus,
}

impl ServerState {
    pub fn new(game: Game, save: Option<SaveFile>) -> Self {
        Self {
            game: RwLock::new(game),
            save: save.map(|file| SaveSlot {
                file,
                issued: AtomicU64::new(0),
                written: Mutex::new(0),
            }),
        }
    }

    /// Resume the saved game if there is one, otherwise start fresh
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let save = config.save_path.clone().map(SaveFile::new);

        let saved = match &save {
            Some(save) => save.load().unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable save: {:#}", e);
                None
            }),
            None => None,
        };

        let game = match saved {
            Some(snapshot) => match Game::from_snapshot(snapshot, rng.clone()) {
                Ok(game) => {
                    tracing::info!("Resumed saved game (size {}, score {})", game.size(), game.score());
                    game
                }
                Err(e) => {
                    tracing::warn!("Saved game rejected: {}", e);
                    Game::new(config.default_size, rng)
                        .context("Invalid default board size")?
                }
            },
            None => Game::new(config.default_size, rng).context("Invalid default board size")?,
        };

        Ok(Self::new(game, save))
    }

    pub fn game(&self) -> RwLockReadGuard<'_, Game> {
        self.game.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn game_mut(&self) -> RwLockWriteGuard<'_, Game> {
        self.game.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Capture the game for saving. Call while holding the write guard so
    /// generations follow the order of changes.
    pub fn pending_save(&self, game: &Game) -> Option<PendingSave> {
        let slot = self.save.as_ref()?;
        Some(PendingSave {
            generation: slot.issued.fetch_add(1, Ordering::SeqCst) + 1,
            snapshot: game.snapshot(),
            status: game.status(),
        })
    }

    /// Write a captured game to the save slot, or clear the slot once the
    /// game has ended. Stale captures are skipped. Save failures are logged,
    /// never surfaced to the player.
    pub async fn persist(&self, pending: Option<PendingSave>) {
        let (Some(slot), Some(pending)) = (&self.save, pending) else {
            return;
        };

        let mut written = slot.written.lock().await;
        if pending.generation <= *written {
            tracing::debug!("Skipping stale save (generation {})", pending.generation);
            return;
        }

        let file = slot.file.clone();
        let PendingSave { generation, snapshot, status } = pending;
        let result =
            tokio::task::spawn_blocking(move || file.record_snapshot(&snapshot, status)).await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to persist game: {:#}", e),
            Err(e) => tracing::warn!("Save task failed: {}", e),
        }
        *written = generation;
    }
}
