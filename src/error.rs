//! Error types for the settlement engine.
//!
//! Validation failures (`EngineError`) and storage failures (`StoreError`)
//! are kept apart; `AppError` is the boundary type used by the binary and
//! by queries that touch both.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Input validation failures. A rejected call never mutates state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Giver equals owner, non-positive points, unknown player, or action cap reached
    #[error("Invalid action: {reason}")]
    InvalidAction { reason: String },

    /// Remove requested with an out-of-range index
    #[error("Invalid action index {index} (hand has {len} actions)")]
    InvalidIndex { index: usize, len: usize },

    /// Fewer than two players, unknown session, or a builder used on the wrong session
    #[error("Invalid session: {reason}")]
    InvalidSession { reason: String },

    /// Player name already present in the registry
    #[error("Player {name} already exists")]
    DuplicatePlayer { name: String },

    /// Empty player name
    #[error("Player name must not be empty")]
    InvalidPlayerName,
}

impl EngineError {
    pub(crate) fn action(reason: impl Into<String>) -> Self {
        EngineError::InvalidAction {
            reason: reason.into(),
        }
    }

    pub(crate) fn session(reason: impl Into<String>) -> Self {
        EngineError::InvalidSession {
            reason: reason.into(),
        }
    }
}

/// Persistence failures raised by repository implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored record is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced at the application boundary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: hand-settlement <ledger.csv> [store-dir]")]
    MissingArgument,

    /// Environment configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
