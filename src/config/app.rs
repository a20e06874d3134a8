//! Application configuration structures.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::validation::{ConfigError, expand_env_vars, validate_header};
use crate::probe::http::HttpProbeConfig;
use crate::run::DEFAULT_CONCURRENCY;
use crate::scheduler::Schedule;

// =============================================================================
// Constants
// =============================================================================

/// Default site registry location.
pub const DEFAULT_SITES_PATH: &str = "configs/sites.json";

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_sites_path() -> String {
    DEFAULT_SITES_PATH.to_string()
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Web server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (default: "0.0.0.0").
    pub bind: String,

    /// Server port (default: 8080).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

// =============================================================================
// Refresh Configuration
// =============================================================================

/// Automatic re-run schedule. Both fields unset disables automatic runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Fixed interval between runs (mutually exclusive with cron).
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,

    /// Cron expression, 6-field (mutually exclusive with interval).
    #[serde(default)]
    pub cron: Option<String>,
}

impl RefreshConfig {
    /// Resolve into a schedule, if any.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if both fields are set or the
    /// cron expression is invalid.
    pub fn schedule(&self) -> Result<Option<Schedule>, ConfigError> {
        match (&self.interval, &self.cron) {
            (Some(_), Some(_)) => Err(ConfigError::ValidationError(
                "refresh: cannot specify both interval and cron".to_string(),
            )),
            (Some(interval), None) => Ok(Some(Schedule::interval(*interval))),
            (None, Some(expr)) => Schedule::cron(expr)
                .map(Some)
                .map_err(|e| ConfigError::ValidationError(format!("refresh: {}", e))),
            (None, None) => Ok(None),
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Web server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// HTTP probe settings.
    #[serde(default)]
    pub probe: HttpProbeConfig,

    /// Probes in flight at once (default: 4, 1 = sequential).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Path to the site registry document.
    #[serde(default = "default_sites_path")]
    pub sites_path: String,

    /// Automatic re-run schedule.
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            probe: HttpProbeConfig::default(),
            concurrency: DEFAULT_CONCURRENCY,
            sites_path: DEFAULT_SITES_PATH.to_string(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        for value in config.probe.headers.values_mut() {
            *value = expand_env_vars(value);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate server bind address
        self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "invalid server bind address: '{}'",
                self.server.bind
            ))
        })?;

        // Validate server port
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server port must be non-zero".to_string(),
            ));
        }

        if self.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "concurrency must be positive".to_string(),
            ));
        }

        if self.probe.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "probe timeout must be positive".to_string(),
            ));
        }

        if self.probe.cache_bust_param.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "probe cache_bust_param cannot be empty".to_string(),
            ));
        }

        for (name, value) in &self.probe.headers {
            validate_header(name, value)?;
        }

        if self.sites_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sites_path cannot be empty".to_string(),
            ));
        }

        self.refresh.schedule()?;

        Ok(())
    }
}
