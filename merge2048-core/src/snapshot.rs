//! Persisted game format and a JSON save file
//!
//! A snapshot is a matrix of tile values plus the score. Where it is stored
//! is up to the caller; `SaveFile` is the file-backed slot used by the
//! server and the terminal game.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::{Game, GameStatus};

/// Board matrix and score as written to storage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Vec<Vec<u32>>,
    pub score: u64,
}

/// Single save slot backed by a JSON file
#[derive(Clone, Debug)]
pub struct SaveFile {
    path: PathBuf,
}

impl SaveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved snapshot. A missing file is `Ok(None)`.
    pub fn load(&self) -> anyhow::Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read save file: {}", self.path.display()))?;
        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse save file: {}", self.path.display()))?;

        Ok(Some(snapshot))
    }

    /// Write the snapshot, replacing any previous save
    pub fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write save file: {}", self.path.display()))?;
        Ok(())
    }

    /// Remove the save. Clearing an absent save is not an error.
    pub fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to clear save file: {}", self.path.display())),
        }
    }

    /// Save an ongoing game; clear the slot once the game is won or lost so
    /// the next start begins fresh
    pub fn record<R: Rng>(&self, game: &Game<R>) -> anyhow::Result<()> {
        self.record_snapshot(&game.snapshot(), game.status())
    }

    /// Same policy as `record` for a snapshot taken earlier
    pub fn record_snapshot(&self, snapshot: &Snapshot, status: GameStatus) -> anyhow::Result<()> {
        if status.is_terminal() {
            self.clear()
        } else {
            self.save(snapshot)
        }
    }
}
