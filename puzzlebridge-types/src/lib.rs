//! Core type definitions for PuzzleBridge.
//!
//! This crate defines the plain data shared by every layer of the game core:
//! - Player and puzzle identifiers
//! - Puzzle records as served by the native host or the HTTP backend
//! - The locally persisted puzzle snapshot, scoped to one player
//!
//! Nothing in here performs I/O. Transports live in `puzzlebridge-transport`,
//! persistence in `puzzlebridge-storage`.

mod ids;
mod puzzle;

pub use ids::{PlayerId, PuzzleId, PLAYER_ID_PREFIX};
pub use puzzle::{AnswerVerdict, PuzzleKind, PuzzleList, PuzzleRecord, PuzzleSnapshot};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid player id: {0:?}")]
    InvalidPlayerId(String),

    #[error("invalid puzzle id: {0:?}")]
    InvalidPuzzleId(String),
}
