use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fittrack_api::{ClientConfig, RetryConfig, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};

use crate::units::WeightUnit;

/// Main configuration structure
///
/// Resolved once at startup from, in increasing priority: defaults, the
/// TOML config file, then `FITTRACK__SECTION__KEY` environment variables
/// (e.g. `FITTRACK__API__BASE_URL`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub units: UnitsConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from a specific file (missing file is fine) plus the environment
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("FITTRACK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::Error::Config(format!("Failed to load config: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the config file path
    /// Uses XDG on Linux/macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| crate::Error::Config("Could not find config directory".into()))?
            .join("fittrack")
            .join("config.toml"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,

    /// Per-request budget; the backend contract is 10 seconds
    pub timeout_secs: u64,

    /// Bearer token from the identity provider
    pub token: Option<String>,

    /// Retries for read requests. Feedback submission never retries.
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
            max_retries: 0,
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            token: self.token.clone(),
            retry: RetryConfig::with_max_retries(self.max_retries),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Snapshot database location; defaults to the platform data dir
    pub snapshot_path: Option<PathBuf>,

    /// Serve from the snapshot without touching the network
    pub offline_mode: bool,

    /// Snapshot rows older than this are pruned on startup
    pub max_snapshot_age_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            offline_mode: false,
            max_snapshot_age_hours: 24 * 7,
        }
    }
}

impl CacheConfig {
    pub fn resolved_snapshot_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.snapshot_path {
            return Ok(path.clone());
        }

        Ok(dirs::data_dir()
            .ok_or_else(|| crate::Error::Config("Could not find data directory".into()))?
            .join("fittrack")
            .join("snapshot.db"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UnitsConfig {
    /// Unit weights are displayed in
    pub preferred: WeightUnit,
}
