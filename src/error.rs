//! Error types for the game engine
//!
//! Every fallible operation of the crate reports a [`GameError`]. Rules
//! contract violations are kept apart from ordinary illegal input so callers
//! can tell a bad click from a broken variant implementation.

use thiserror::Error;

use crate::board::Side;

/// Errors raised by the board, rules, game and search layers
#[derive(Error, Debug)]
pub enum GameError {
    /// Move is not in the current legal move list
    #[error("illegal move: {mv}")]
    IllegalMove { mv: String },

    /// A rules-generated move could not be applied to the position it came from
    #[error("rules invariant violated: {0}")]
    InvariantViolation(String),

    /// Persisted game or rules data could not be parsed
    #[error("format error on line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    #[error("unknown search algorithm: {0}")]
    UnknownAlgorithm(String),

    /// `run_game` was asked to move for an empty player slot
    #[error("no player assigned to {0}")]
    NoPlayer(Side),

    #[error("game is already over")]
    GameOver,

    /// Search was expected to produce a move but the position is terminal
    #[error("no move available")]
    NoMove,

    #[error("scripted player has no moves left")]
    ScriptExhausted,

    /// The UI side of a relay player hung up
    #[error("player input channel closed")]
    PlayerDisconnected,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GameError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        GameError::Format {
            line,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type GameResult<T> = Result<T, GameError>;
