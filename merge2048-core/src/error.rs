//! Engine error types

use crate::board::{MAX_SIZE, MIN_SIZE};

/// Errors raised by the engine. Every failing operation leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid direction: {0:?}")]
    InvalidDirection(String),

    #[error("invalid board size {0}: must be between {} and {}", MIN_SIZE, MAX_SIZE)]
    InvalidSize(usize),

    #[error("malformed grid: row {row} has {found} cells, expected {expected}")]
    MalformedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
}
