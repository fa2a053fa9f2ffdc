//! MERGE2048 Core - Game engine
//!
//! This crate provides the core game logic for the 2048 sliding-tile puzzle:
//! - Square board of power-of-two tiles and the shift/merge algorithm
//! - Game state with score, seeded tile spawning and win/loss detection
//! - Snapshot format for persisting and restoring a game

pub mod board;
pub mod error;
pub mod game;
pub mod snapshot;

// Re-exports for convenient access
pub use board::{Board, Direction, Slide, DEFAULT_SIZE, DIRECTIONS, MAX_SIZE, MIN_SIZE, SPAWN_VALUE, TARGET_VALUE};
pub use error::EngineError;
pub use game::{Game, GameStatus, MoveOutcome, INITIAL_TILES};
pub use snapshot::{SaveFile, Snapshot};
