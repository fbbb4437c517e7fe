//! # Gateway Configuration
//!
//! Configuration for the data sync client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ATLAS_GATEWAY_URL=http://gateway.local/api                         │
//! │     ATLAS_EXPORT_TIMEOUT_SECS=600                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/atlas-suite/sync.toml (Linux)                            │
//! │     ~/Library/Application Support/com.atlas.suite/sync.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost gateway, 300s export ceiling, full module roster         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [gateway]
//! base_url = "http://localhost:8000/api"
//! modules = ["manager", "financial", "production", "cloud"]
//!
//! [transfer]
//! export_timeout_secs = 300
//! health_timeout_secs = 5
//! download_dir = "/home/operator/exports"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use atlas_core::{ModuleId, DEFAULT_EXPORT_TIMEOUT_SECS};

// =============================================================================
// Config Errors
// =============================================================================

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration and client-construction failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    /// Gateway URL is not a usable HTTP(S) URL.
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// A setting is out of range.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

// =============================================================================
// Gateway Settings
// =============================================================================

/// Where the gateway lives and which modules it fronts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Base URL of the gateway API (the `/data/*` endpoints live under it).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deployed module roster. Broadcast sync submits this list in full;
    /// the health monitor probes each entry.
    #[serde(default = "default_roster")]
    pub modules: Vec<ModuleId>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_roster() -> Vec<ModuleId> {
    ModuleId::ALL.to_vec()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        GatewaySettings {
            base_url: default_base_url(),
            modules: default_roster(),
        }
    }
}

// =============================================================================
// Transfer Settings
// =============================================================================

/// Transfer behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Hard ceiling for a single export transfer (seconds). Exceeding it
    /// surfaces as a TIMEOUT classification, not a plain network failure.
    #[serde(default = "default_export_timeout")]
    pub export_timeout_secs: u64,

    /// Per-module health probe timeout (seconds).
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,

    /// Directory export artifacts are delivered to. Current directory when
    /// unset.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

fn default_export_timeout() -> u64 {
    DEFAULT_EXPORT_TIMEOUT_SECS
}

fn default_health_timeout() -> u64 {
    5
}

impl Default for TransferSettings {
    fn default() -> Self {
        TransferSettings {
            export_timeout_secs: default_export_timeout(),
            health_timeout_secs: default_health_timeout(),
            download_dir: None,
        }
    }
}

// =============================================================================
// Main Gateway Configuration
// =============================================================================

/// Complete data sync client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway location and roster.
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Transfer behavior.
    #[serde(default)]
    pub transfer: TransferSettings,
}

impl GatewayConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.gateway.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.gateway.base_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Gateway URL must be http or https, got: {}",
                self.gateway.base_url
            )));
        }

        if self.transfer.export_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "export_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.gateway.modules.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "module roster must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ATLAS_GATEWAY_URL") {
            debug!(url = %url, "Overriding gateway URL from environment");
            self.gateway.base_url = url;
        }

        if let Ok(secs) = std::env::var("ATLAS_EXPORT_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                self.transfer.export_timeout_secs = parsed;
            }
        }

        if let Ok(secs) = std::env::var("ATLAS_HEALTH_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                self.transfer.health_timeout_secs = parsed;
            }
        }

        if let Ok(dir) = std::env::var("ATLAS_DOWNLOAD_DIR") {
            self.transfer.download_dir = Some(PathBuf::from(dir));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "atlas", "suite")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    // =========================================================================
    // Endpoint Helpers
    // =========================================================================

    fn base(&self) -> &str {
        self.gateway.base_url.trim_end_matches('/')
    }

    /// `POST /data/export`
    pub fn export_url(&self) -> String {
        format!("{}/data/export", self.base())
    }

    /// `POST /data/import/{module}/{entity}`
    pub fn import_url(&self, module: ModuleId, entity: &str) -> String {
        format!("{}/data/import/{}/{}", self.base(), module, entity)
    }

    /// `POST /data/sync`
    pub fn sync_url(&self) -> String {
        format!("{}/data/sync", self.base())
    }

    /// `GET /health/{module}`
    pub fn health_url(&self, module: ModuleId) -> String {
        format!("{}/health/{}", self.base(), module)
    }

    /// Export transfer ceiling as a [`Duration`].
    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer.export_timeout_secs)
    }

    /// Health probe timeout as a [`Duration`].
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer.health_timeout_secs)
    }

    /// Delivery directory for export artifacts.
    pub fn download_dir(&self) -> PathBuf {
        self.transfer
            .download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
