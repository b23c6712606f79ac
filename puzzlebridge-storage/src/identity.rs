//! Per-installation player identity.

use crate::error::StorageResult;
use crate::kv::KeyValueStore;
use crate::keys;
use puzzlebridge_types::PlayerId;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Loads, mints and persists the player id.
///
/// The id is read from storage at most once per process; afterwards the
/// cached value is returned until [`PlayerIdentity::reset`].
pub struct PlayerIdentity {
    store: Arc<dyn KeyValueStore>,
    cached: Mutex<Option<PlayerId>>,
}

impl PlayerIdentity {
    /// Creates an identity backed by `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
        }
    }

    fn cached(&self) -> MutexGuard<'_, Option<PlayerId>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the persisted id, minting and persisting one if none exists.
    pub fn current(&self) -> StorageResult<PlayerId> {
        let mut cached = self.cached();
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let id = match self.store.get(keys::PLAYER_ID)? {
            Some(raw) => match PlayerId::parse(&raw) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Replacing unusable stored player id: {e}");
                    self.mint()?
                }
            },
            None => self.mint()?,
        };
        *cached = Some(id.clone());
        Ok(id)
    }

    /// Discards the persisted id and mints a fresh one.
    ///
    /// Snapshots of the previous player are left alone; they stop being
    /// usable because their owner no longer matches.
    pub fn reset(&self) -> StorageResult<PlayerId> {
        let mut cached = self.cached();
        self.store.remove(keys::PLAYER_ID)?;
        *cached = None;
        let id = self.mint()?;
        *cached = Some(id.clone());
        Ok(id)
    }

    fn mint(&self) -> StorageResult<PlayerId> {
        let id = PlayerId::generate();
        self.store.set(keys::PLAYER_ID, id.as_str())?;
        info!("Generated new player id {id}");
        Ok(id)
    }
}
