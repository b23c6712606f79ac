//! Game configuration.

use crate::error::{GameError, GameResult};
use puzzlebridge_transport::{BridgeConfig, HttpTransportConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration, loadable from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// HTTP backend settings, used when no native bridge is present.
    pub http: HttpTransportConfig,
    /// Deadline for one native call (in seconds). `None` waits indefinitely.
    pub bridge_timeout_secs: Option<u64>,
    /// Directory for persisted state. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl GameConfig {
    /// Reads a configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> GameResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GameError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| GameError::Config(format!("{}: {e}", path.display())))
    }

    /// Native bridge settings derived from this config.
    #[must_use]
    pub fn bridge(&self) -> BridgeConfig {
        BridgeConfig {
            call_timeout: self.bridge_timeout_secs.map(Duration::from_secs),
        }
    }
}
