//! Persisted storage for PuzzleBridge.
//!
//! Two things survive a restart: the player id and the cached puzzle
//! snapshot. Both live in a small [`KeyValueStore`]; reads are synchronous
//! and in-process.

mod error;
mod identity;
mod kv;

pub use error::{StorageError, StorageResult};
pub use identity::PlayerIdentity;
pub use kv::{FileStore, KeyValueStore, MemoryStore};

/// Storage keys shared with other clients of the same store.
pub mod keys {
    /// The player id string.
    pub const PLAYER_ID: &str = "playerId";
    /// JSON object `{playerId, puzzles}`.
    pub const PLAYER_PUZZLES: &str = "playerPuzzles";
}
