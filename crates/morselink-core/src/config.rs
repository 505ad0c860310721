use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::{RemoteEndpoint, TimingScheme};

/// Runtime configuration consumed by the core crates.
///
/// Every field has a default, so a partial (or absent) config file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Port a server-role session listens on.
    pub listen_port: u16,

    /// Peer a client-role session connects to.
    pub remote: Option<RemoteEndpoint>,

    /// Base flash duration in milliseconds, the Morse "unit". Every timeline
    /// duration is a multiple of this.
    pub unit_ms: u64,

    /// Flash ratio table.
    pub timing: TimingScheme,

    /// Ordered translation provider ids. Empty means table-only encoding.
    pub providers: Vec<String>,

    /// Flash color. Consumed by the presentation layer only.
    pub flash_color: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            listen_port: 5000,
            remote: None,
            unit_ms: 200,
            timing: TimingScheme::Classic,
            providers: Vec::new(),
            flash_color: "white".to_string(),
        }
    }
}

impl LinkConfig {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
