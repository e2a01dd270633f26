//! Connector configuration loaded from TOML.
//!
//! ```toml
//! [server]
//! bind_addr = "127.0.0.1:3000"
//! web_root = "webapp/dist"
//!
//! [namespace]
//! max_depth = 7
//! seed_on_start = true
//!
//! [live]
//! window_ms = 60000
//! legacy_type_scan = false
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uns_protocol::{LiveConfig, DEFAULT_MAX_DEPTH};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub server: ServerSection,
    pub namespace: NamespaceSection,
    pub live: LiveSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_addr: String,
    /// Static UI assets; auto-detected when unset.
    pub web_root: Option<PathBuf>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            web_root: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceSection {
    pub max_depth: usize,
    /// Start from the FY-Fab reference tree instead of an empty one.
    pub seed_on_start: bool,
}

impl Default for NamespaceSection {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            seed_on_start: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveSection {
    pub window_ms: i64,
    pub legacy_type_scan: bool,
}

impl Default for LiveSection {
    fn default() -> Self {
        let live = LiveConfig::default();
        Self {
            window_ms: live.window_ms,
            legacy_type_scan: live.legacy_type_scan,
        }
    }
}

impl From<&LiveSection> for LiveConfig {
    fn from(section: &LiveSection) -> Self {
        LiveConfig {
            window_ms: section.window_ms,
            legacy_type_scan: section.legacy_type_scan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ConnectorConfig {
    /// `<config dir>/uns/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("uns").join("config.toml"))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn live_config(&self) -> LiveConfig {
        LiveConfig::from(&self.live)
    }
}
