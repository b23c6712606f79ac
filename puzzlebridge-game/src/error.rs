//! Error types for the game layer.

use puzzlebridge_storage::StorageError;
use puzzlebridge_transport::TransportError;
use thiserror::Error;

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;

/// Errors that can occur in game operations.
///
/// Wrong answers and unknown puzzle ids are not errors; they come back as
/// ordinary values and are shown as inline feedback.
#[derive(Debug, Error)]
pub enum GameError {
    /// Either transport failed to execute the operation.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Persisted storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The backend answered with a payload of the wrong shape.
    #[error("unexpected payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// An embedded fragment could not be loaded.
    #[error("fragment load failed: {0}")]
    Fragment(String),

    /// The configuration file could not be read.
    #[error("config error: {0}")]
    Config(String),

    /// A puzzle operation was issued with no puzzle open.
    #[error("no puzzle is open")]
    NoActivePuzzle,

    /// A puzzle operation does not apply in the current session state.
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),
}

impl GameError {
    /// Message suitable for an error view.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
