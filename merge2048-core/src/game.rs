//! Game state: board, score, tile spawning and terminal detection

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Direction, DIRECTIONS, SPAWN_VALUE, TARGET_VALUE};
use crate::error::EngineError;
use crate::snapshot::Snapshot;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Tiles placed on an empty board when a game starts
pub const INITIAL_TILES: usize = 2;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Derived game status. Won and Lost are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Ongoing,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

/// What a single move did
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    /// Board changed (and a tile was spawned if there was room)
    pub moved: bool,
    /// Score gained from merges
    pub score_delta: u64,
    /// Pairs merged
    pub merges: usize,
    /// Cell that received the new tile
    pub spawned: Option<(usize, usize)>,
    /// Status after the spawn
    pub status: GameStatus,
}

// ============================================================================
// GAME
// ============================================================================

/// A 2048 game with its own random source.
///
/// The engine never gates input on terminal states; callers check
/// [`Game::status`] and stop sending moves once it is terminal.
#[derive(Clone, Debug)]
pub struct Game<R = ChaCha8Rng> {
    board: Board,
    score: u64,
    rng: R,
}

impl Game<ChaCha8Rng> {
    /// New game with a reproducible tile sequence
    pub fn seeded(size: usize, seed: u64) -> Result<Self, EngineError> {
        Self::new(size, ChaCha8Rng::seed_from_u64(seed))
    }

    /// New game seeded from OS entropy
    pub fn from_entropy(size: usize) -> Result<Self, EngineError> {
        Self::new(size, ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> Game<R> {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty `size` x `size` board with the two starting tiles
    pub fn new(size: usize, rng: R) -> Result<Self, EngineError> {
        let board = Board::new(size)?;
        let mut game = Self { board, score: 0, rng };
        game.place_initial_tiles();
        Ok(game)
    }

    /// Resume from a stored snapshot. Only the grid shape is checked.
    pub fn from_snapshot(snapshot: Snapshot, rng: R) -> Result<Self, EngineError> {
        let board = Board::from_rows(snapshot.board)?;
        Ok(Self {
            board,
            score: snapshot.score,
            rng,
        })
    }

    /// Replace the whole board with a fresh one and reset the score
    pub fn new_game(&mut self, size: usize) -> Result<(), EngineError> {
        self.board = Board::new(size)?;
        self.score = 0;
        self.place_initial_tiles();
        Ok(())
    }

    /// Take an externally supplied board and score as the current state
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), EngineError> {
        self.board = Board::from_rows(snapshot.board)?;
        self.score = snapshot.score;
        Ok(())
    }

    fn place_initial_tiles(&mut self) {
        for _ in 0..INITIAL_TILES {
            self.spawn_random_tile();
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn max_tile(&self) -> u32 {
        self.board.max_tile()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.rows(),
            score: self.score,
        }
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Slide the board. When anything changed, one new tile is spawned
    /// before returning and the status reflects the board after the spawn.
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        let slide = self.board.slide(direction);
        self.score = self.score.saturating_add(slide.score_delta);

        let spawned = if slide.changed {
            self.spawn_random_tile()
        } else {
            None
        };

        MoveOutcome {
            moved: slide.changed,
            score_delta: slide.score_delta,
            merges: slide.merges,
            spawned,
            status: self.status(),
        }
    }

    /// Put a 2 on a uniformly chosen empty cell. `None` when the board is full.
    pub fn spawn_random_tile(&mut self) -> Option<(usize, usize)> {
        let empty = self.board.empty_cells();
        if empty.is_empty() {
            return None;
        }

        let (row, col) = empty[self.rng.gen_range(0..empty.len())];
        self.board.set(row, col, SPAWN_VALUE);
        Some((row, col))
    }

    /// Directions that would change the board
    pub fn available_moves(&self) -> Vec<Direction> {
        DIRECTIONS
            .into_iter()
            .filter(|&direction| self.board.clone().slide(direction).changed)
            .collect()
    }

    // ========================================================================
    // TERMINAL STATES
    // ========================================================================

    pub fn is_win(&self) -> bool {
        self.board.contains(TARGET_VALUE)
    }

    /// Board full and no two orthogonal neighbours share a value
    pub fn is_game_over(&self) -> bool {
        self.board.is_full() && !self.board.has_adjacent_pair()
    }

    /// Won takes precedence over Lost when both hold
    pub fn status(&self) -> GameStatus {
        if self.is_win() {
            GameStatus::Won
        } else if self.is_game_over() {
            GameStatus::Lost
        } else {
            GameStatus::Ongoing
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
