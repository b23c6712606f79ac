//! Offline-first puzzle state.
//!
//! The store is either **Trusted-Local** (it holds a snapshot owned by the
//! current player) or **Stale** (it holds nothing usable). Every query first
//! checks ownership against the current player id, so a snapshot belonging to
//! someone else is dropped and replaced, never merged.
//!
//! Mutations are delegated to the backend and followed by a full re-sync
//! rather than a local patch.

use crate::client::GameBackend;
use crate::error::{GameError, GameResult};
use puzzlebridge_storage::{keys, KeyValueStore, PlayerIdentity};
use puzzlebridge_types::{PlayerId, PuzzleId, PuzzleRecord, PuzzleSnapshot};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether the store can answer queries without a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Stale,
    TrustedLocal,
}

/// Local cache of the player's puzzle progress.
pub struct PuzzleStateStore {
    backend: Arc<dyn GameBackend>,
    storage: Arc<dyn KeyValueStore>,
    identity: Arc<PlayerIdentity>,
    snapshot: Option<PuzzleSnapshot>,
}

impl PuzzleStateStore {
    /// Creates the store and tries to adopt the persisted snapshot.
    pub fn new(
        backend: Arc<dyn GameBackend>,
        storage: Arc<dyn KeyValueStore>,
        identity: Arc<PlayerIdentity>,
    ) -> GameResult<Self> {
        let player = identity.current()?;
        let snapshot = load_persisted(storage.as_ref(), &player);
        debug!(
            "Puzzle store starting {}",
            if snapshot.is_some() { "trusted" } else { "stale" }
        );
        Ok(Self {
            backend,
            storage,
            identity,
            snapshot,
        })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> StoreState {
        if self.snapshot.is_some() {
            StoreState::TrustedLocal
        } else {
            StoreState::Stale
        }
    }

    /// The held snapshot, if trusted.
    #[must_use]
    pub fn snapshot(&self) -> Option<&PuzzleSnapshot> {
        self.snapshot.as_ref()
    }

    /// The current player id.
    pub fn player(&self) -> GameResult<PlayerId> {
        Ok(self.identity.current()?)
    }

    /// Drops the in-memory snapshot; the next query refreshes.
    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    /// Fetches the authoritative list and adopts it as the new snapshot.
    ///
    /// On failure the store is left Stale.
    pub async fn refresh(&mut self) -> GameResult<&[PuzzleRecord]> {
        self.snapshot = None;
        let player = self.identity.current()?;
        let puzzles = self.backend.player_puzzles(&player).await?;
        let snapshot = PuzzleSnapshot::new(player, puzzles);

        match serde_json::to_string(&snapshot) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(keys::PLAYER_PUZZLES, &raw) {
                    warn!("Failed to persist puzzle snapshot: {e}");
                }
            }
            Err(e) => warn!("Failed to encode puzzle snapshot: {e}"),
        }

        Ok(&self.snapshot.insert(snapshot).puzzles)
    }

    async fn ensure_fresh(&mut self) -> GameResult<&PuzzleSnapshot> {
        let player = self.identity.current()?;
        let usable = self
            .snapshot
            .as_ref()
            .is_some_and(|s| s.is_owned_by(&player));

        if !usable {
            if self.snapshot.is_some() {
                debug!("Snapshot belongs to a previous player, refreshing");
            }
            self.refresh().await?;
        }

        self.snapshot
            .as_ref()
            .ok_or(GameError::InvalidState("no snapshot after refresh"))
    }

    /// All puzzles, in backend order.
    pub async fn puzzles(&mut self) -> GameResult<&[PuzzleRecord]> {
        Ok(&self.ensure_fresh().await?.puzzles)
    }

    /// Looks up a puzzle, refreshing first if Stale.
    ///
    /// `Ok(None)` means the list is loaded and has no such id; a failed
    /// refresh is an `Err`.
    pub async fn find(&mut self, puzzle_id: &PuzzleId) -> GameResult<Option<PuzzleRecord>> {
        Ok(self.ensure_fresh().await?.find(puzzle_id).cloned())
    }

    /// Completes a puzzle on the backend, then re-syncs.
    pub async fn mark_completed(&mut self, puzzle_id: &PuzzleId) -> GameResult<()> {
        let player = self.identity.current()?;
        self.backend.complete_puzzle(&player, puzzle_id).await?;
        self.refresh().await?;
        Ok(())
    }

    /// Resets progress on the backend, then re-syncs.
    pub async fn reset_progress(&mut self) -> GameResult<Value> {
        let player = self.identity.current()?;
        let response = self.backend.reset_progress(&player).await?;
        self.refresh().await?;
        Ok(response)
    }

    /// Unlocks every puzzle on the backend, then re-syncs.
    pub async fn unlock_all(&mut self) -> GameResult<Value> {
        let player = self.identity.current()?;
        let response = self.backend.unlock_all(&player).await?;
        self.refresh().await?;
        Ok(response)
    }

    /// Starts over as a brand-new player. The store goes Stale.
    pub fn switch_player(&mut self) -> GameResult<PlayerId> {
        let player = self.identity.reset()?;
        self.snapshot = None;
        info!("Switched to player {player}");
        Ok(player)
    }
}

/// Reads the persisted snapshot, adopting it only if it parses, belongs to
/// `player` and holds a non-empty puzzle list. Unparseable data is cleared.
fn load_persisted(storage: &dyn KeyValueStore, player: &PlayerId) -> Option<PuzzleSnapshot> {
    let raw = match storage.get(keys::PLAYER_PUZZLES) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read puzzle snapshot: {e}");
            return None;
        }
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            clear_corrupt(storage, &e);
            return None;
        }
    };

    if value.get("playerId").and_then(Value::as_str) != Some(player.as_str()) {
        debug!("Persisted snapshot belongs to another player");
        return None;
    }
    match value.get("puzzles") {
        Some(Value::Array(list)) if !list.is_empty() => {}
        _ => {
            debug!("Persisted snapshot has no usable puzzle list");
            return None;
        }
    }

    match serde_json::from_value::<PuzzleSnapshot>(value) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            clear_corrupt(storage, &e);
            None
        }
    }
}

fn clear_corrupt(storage: &dyn KeyValueStore, error: &serde_json::Error) {
    warn!("Clearing corrupt puzzle snapshot: {error}");
    if let Err(e) = storage.remove(keys::PLAYER_PUZZLES) {
        warn!("Failed to clear corrupt puzzle snapshot: {e}");
    }
}
