//! Error taxonomy for rejected game operations
//!
//! Every variant is local and recoverable: the caller can retry or start a
//! new game. A tower collapse is not an error, it is reported as
//! [`GameEvent::GameOver`](crate::sim::GameEvent::GameOver).

use thiserror::Error;

use crate::sim::BlockId;

/// Result alias used by every fallible game operation
pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Operation requested while its preconditions are unmet
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Undo/redo requested past the recorded history
    #[error("no further history in that direction (turn {turn_index})")]
    AtBoundary { turn_index: i32 },

    /// Pick on a block that is not interactive, or while the tower is down
    #[error("block {0} cannot be picked")]
    IllegalPick(BlockId),

    /// Configuration length does not match the tower's block count
    #[error("configuration has {actual} poses, tower has {expected} blocks")]
    ConfigurationMismatch { expected: usize, actual: usize },

    /// The physics collaborator has no body for this block
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),
}
