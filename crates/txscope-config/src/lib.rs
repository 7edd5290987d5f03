//! Configuration management for txscope
//!
//! This module handles loading, validation, and management of
//! txscope configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Remote transactions API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote API, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path prefix prepended to every endpoint
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path_prefix: default_path_prefix(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_path_prefix() -> String {
    "/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl ApiConfig {
    /// Endpoint root, e.g. `http://localhost:5000/api`
    pub fn endpoint_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.path_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Explorer timing and paging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Debounce window for search input
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Background refresh interval
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// How long a notification stays visible
    #[serde(default = "default_toast_lifetime_ms")]
    pub toast_lifetime_ms: u64,
    /// Maximum notifications kept at once
    #[serde(default = "default_toast_capacity")]
    pub toast_capacity: usize,
    /// How long a failed optimistic entry stays in the list
    #[serde(default = "default_failed_removal_ms")]
    pub failed_removal_ms: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            refresh_interval_ms: default_refresh_interval_ms(),
            page_size: default_page_size(),
            toast_lifetime_ms: default_toast_lifetime_ms(),
            toast_capacity: default_toast_capacity(),
            failed_removal_ms: default_failed_removal_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_refresh_interval_ms() -> u64 {
    15_000
}

fn default_page_size() -> usize {
    10
}

fn default_toast_lifetime_ms() -> u64 {
    2_500
}

fn default_toast_capacity() -> usize {
    5
}

fn default_failed_removal_ms() -> u64 {
    2_500
}

impl ExplorerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn toast_lifetime(&self) -> Duration {
        Duration::from_millis(self.toast_lifetime_ms)
    }

    pub fn failed_removal(&self) -> Duration {
        Duration::from_millis(self.failed_removal_ms)
    }
}

/// Create-form draft persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftsConfig {
    /// JSON file holding saved drafts
    #[serde(default = "default_drafts_path")]
    pub path: PathBuf,
    /// Key the create-form draft is stored under
    #[serde(default = "default_draft_key")]
    pub key: String,
}

impl Default for DraftsConfig {
    fn default() -> Self {
        Self {
            path: default_drafts_path(),
            key: default_draft_key(),
        }
    }
}

fn default_drafts_path() -> PathBuf {
    PathBuf::from("./data/drafts.json")
}

fn default_draft_key() -> String {
    "txDraft:v1".to_string()
}

/// Display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Currency label shown next to amounts
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Block explorer link prefix for transaction hashes
    #[serde(default = "default_explorer_tx_url")]
    pub explorer_tx_url: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            explorer_tx_url: default_explorer_tx_url(),
        }
    }
}

fn default_currency() -> String {
    "ETH".to_string()
}

fn default_explorer_tx_url() -> String {
    "https://etherscan.io/tx/".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Explorer timing and paging
    #[serde(default)]
    pub explorer: ExplorerConfig,
    /// Draft persistence
    #[serde(default)]
    pub drafts: DraftsConfig,
    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError,
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api.base_url".to_string(),
            });
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.explorer.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "explorer.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.explorer.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "explorer.refresh_interval_ms".to_string(),
                reason: "Refresh interval must be greater than 0".to_string(),
            });
        }

        if self.explorer.toast_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "explorer.toast_capacity".to_string(),
                reason: "At least one notification slot is required".to_string(),
            });
        }

        if self.drafts.key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "drafts.key".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}
