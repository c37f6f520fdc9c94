//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::application::orchestrator::SNAPSHOT_KEY;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dexscreener: DexscreenerSection,
    #[serde(default)]
    pub gecko: GeckoSection,
    pub oracle: OracleSection,
    pub store: StoreSection,
    pub tokens: TokensSection,
    pub logging: LoggingSection,
}

/// DexScreener API configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct DexscreenerSection {
    /// DexScreener public API base URL
    pub api_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// GeckoTerminal API configuration section (fallback provider)
#[derive(Debug, Clone, Deserialize)]
pub struct GeckoSection {
    /// GeckoTerminal public API base URL
    pub api_url: String,
    /// Set to false to run without the fallback provider
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for GeckoSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.geckoterminal.com/api/v2".to_string(),
            enabled: true,
        }
    }
}

/// Refresh-loop pacing and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OracleSection {
    /// Delay between consecutive token requests in milliseconds
    pub request_delay_ms: u64,
    /// Delay between retry rounds for one token in milliseconds
    pub retry_delay_ms: u64,
    /// Attempts per token before falling back to the previous snapshot
    pub max_retries: u32,
}

/// Snapshot store configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// Directory the snapshot files live in
    pub path: String,
    /// Key the published snapshot is stored under
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
}

/// Token universe configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct TokensSection {
    /// Path to the token-list JSON file (spreadsheet export)
    pub token_list: String,
    /// Default network for listed tokens
    #[serde(default = "default_network")]
    pub network: String,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log to file (in addition to stdout)
    pub log_to_file: bool,
    /// Log file path
    pub log_file: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_snapshot_key() -> String {
    SNAPSHOT_KEY.to_string()
}

fn default_network() -> String {
    "base".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dexscreener.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "dexscreener api_url cannot be empty".to_string(),
            ));
        }

        if self.dexscreener.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "timeout_secs must be > 0, got {}",
                self.dexscreener.timeout_secs
            )));
        }

        if self.gecko.enabled && self.gecko.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "gecko api_url cannot be empty while gecko is enabled".to_string(),
            ));
        }

        if self.oracle.max_retries == 0 {
            return Err(ConfigError::ValidationError(format!(
                "max_retries must be > 0, got {}",
                self.oracle.max_retries
            )));
        }

        if self.store.path.is_empty() {
            return Err(ConfigError::ValidationError(
                "store path cannot be empty".to_string(),
            ));
        }

        if self.store.snapshot_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "snapshot_key cannot be empty".to_string(),
            ));
        }

        if self.tokens.token_list.is_empty() {
            return Err(ConfigError::ValidationError(
                "token_list cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
