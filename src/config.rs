use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// Remote and schema constants
// =============================================================================

/// Schema version of the payload this build understands (compared exactly)
pub const SUPPORTED_SCHEMA_VERSION: &str = "1.8";

/// Default host publishing the character stats document
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/Database-Clarity/Character-Stats/wip";

/// Update descriptor path relative to the base URL
pub const DEFAULT_UPDATE_PATH: &str = "update.json";

/// Placeholder in the payload path replaced by [`SUPPORTED_SCHEMA_VERSION`]
pub const SCHEMA_VERSION_PLACEHOLDER: &str = "{schemaVersion}";

/// Payload path relative to the base URL
pub const DEFAULT_PAYLOAD_PATH: &str = "versions/{schemaVersion}/CharacterStatInfo-NI.json";

// =============================================================================
// Storage keys
// =============================================================================

/// Key holding the serialized payload document
pub const PAYLOAD_KEY: &str = "clarity-character-stats";

/// Key holding the version stamp of the stored payload
pub const STAMP_KEY: &str = "clarity-character-stats-version";

// =============================================================================
// Time-related constants
// =============================================================================

/// Default refresh interval in milliseconds (1 hour)
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 60 * 60 * 1000;

/// Default timeout applied around a single sync in milliseconds (30 seconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Loads configuration from a JSON file; missing fields use defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteConfig {
    pub base_url: String,
    pub update_path: String,
    pub payload_path: String,
}

impl RemoteConfig {
    /// Payload path with the schema placeholder resolved, so the fetched
    /// document always matches the schema this build accepts
    pub fn payload_path(&self) -> String {
        self.payload_path
            .replace(SCHEMA_VERSION_PLACEHOLDER, SUPPORTED_SCHEMA_VERSION)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            update_path: DEFAULT_UPDATE_PATH.to_string(),
            payload_path: DEFAULT_PAYLOAD_PATH.to_string(),
        }
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Refresh interval for `watch` in milliseconds
    pub refresh_interval: u64,
    /// Timeout around one sync in milliseconds
    pub fetch_timeout: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL_MS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

/// Returns the path to the data directory for stats-cache.
/// Uses $XDG_DATA_HOME/stats-cache if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/stats-cache,
/// or ./stats-cache if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("cache.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("stats-cache.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("stats-cache")
}
