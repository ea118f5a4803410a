//! Nexus configuration.
//!
//! Loaded from `~/.nexus/config.toml`. Defaults are used when the file is
//! missing; every key is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Nexus configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Where the home document is stored. Defaults to `~/.nexus/`.
    pub data_dir: Option<PathBuf>,

    /// Knowledge base file to use instead of the built-in one.
    pub knowledge_base: Option<PathBuf>,

    /// How long the assistant "types" before replying.
    pub typing_delay_ms: u64,

    /// Maximum number of chat messages kept. `0` keeps everything.
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            knowledge_base: None,
            typing_delay_ms: 1000,
            history_limit: 500,
        }
    }
}

impl Config {
    /// Load config from `~/.nexus/config.toml`.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.nexus/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".nexus").join("config.toml"))
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }
}
