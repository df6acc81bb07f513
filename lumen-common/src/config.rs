//! Configuration loading for Lumen clients
//!
//! Bootstrap configuration comes from a single TOML file. Every section and
//! every key is optional: a missing file, a missing section, or an unparsable
//! file falls back to compiled defaults with a warning, never a startup error.
//!
//! # Resolution priority
//!
//! 1. Explicit path passed by the embedding application (highest priority)
//! 2. `LUMEN_CONFIG` environment variable
//! 3. Platform config file (`~/.config/lumen/config.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! After the file is loaded, `LUMEN_API_BASE_URL` and `LUMEN_LOG_LEVEL`
//! override the corresponding keys.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LUMEN_CONFIG";
/// Environment variable overriding `api.base_url`
pub const API_BASE_URL_ENV_VAR: &str = "LUMEN_API_BASE_URL";
/// Environment variable overriding `logging.level`
pub const LOG_LEVEL_ENV_VAR: &str = "LUMEN_LOG_LEVEL";

const APP_DIR: &str = "lumen";
const CONFIG_FILE_NAME: &str = "config.toml";
const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Retry policy for flaky endpoints
    pub retry: RetryConfig,
    /// Root store behaviour
    pub store: StoreConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Credential file location (defaults to the platform data directory)
    pub credentials_path: Option<PathBuf>,
}

/// Remote API settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every REST path is joined onto
    pub base_url: String,
    /// Base used to absolutise relative asset URLs in payloads.
    ///
    /// Falls back to `base_url` when not set.
    pub asset_base_url: Option<String>,
    /// Per-request timeout enforced by the HTTP client
    pub timeout_ms: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl ApiConfig {
    /// Effective asset base (explicit value or the API base)
    pub fn asset_base(&self) -> &str {
        self.asset_base_url.as_deref().unwrap_or(&self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            asset_base_url: None,
            timeout_ms: 15_000,
            user_agent: concat!("Lumen/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Retry policy settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one (clamped to at least 1)
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay_ms: u64,
    /// Upper bound for any single delay before jitter
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

/// Root store settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Ignore fetch completions that belong to a superseded request.
    ///
    /// `false` keeps last-writer-wins semantics.
    pub ignore_stale_completions: bool,
    /// Number of dispatched actions buffered for action-log subscribers
    pub action_log_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ignore_stale_completions: false,
            action_log_capacity: 100,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or an EnvFilter directive
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve, load and apply environment overrides.
    ///
    /// Never fails: any problem is logged and defaults are used instead.
    pub fn load(explicit_path: Option<&Path>) -> Self {
        let mut config = match resolve_config_path(explicit_path) {
            Some(path) => match Self::from_file(&path) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Config file unusable, using defaults");
                    Self::default()
                }
            },
            None => {
                info!("No config file found, using compiled defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config
    }

    /// Apply `LUMEN_API_BASE_URL` / `LUMEN_LOG_LEVEL` overrides
    pub fn apply_env_overrides(&mut self) {
        if let Some(base_url) = non_empty_env(API_BASE_URL_ENV_VAR) {
            self.api.base_url = base_url;
        }
        if let Some(level) = non_empty_env(LOG_LEVEL_ENV_VAR) {
            self.logging.level = level;
        }
    }

    /// Validate values that defaults cannot repair
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config("api.base_url must not be empty".to_string()));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(Error::Config(format!(
                "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                self.retry.base_delay_ms, self.retry.max_delay_ms
            )));
        }
        Ok(())
    }

    /// Credential file location (configured or platform default)
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .unwrap_or_else(default_credentials_path)
    }
}

/// Find the config file following the resolution priority
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: explicit path
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: environment variable
    if let Some(path) = non_empty_env(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: platform config file, only if it exists
    default_config_path().filter(|path| path.exists())
}

/// Platform config file path (`<config_dir>/lumen/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE_NAME))
}

/// Platform credential file path (`<data_local_dir>/lumen/credentials.json`)
pub fn default_credentials_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./lumen_data"))
        .join(CREDENTIALS_FILE_NAME)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
