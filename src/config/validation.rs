//! Shared parsing and validation helpers for configuration documents.

use std::sync::LazyLock;
use std::time::Duration;

use regex::{Captures, Regex};
use reqwest::header::{HeaderName, HeaderValue};
use thiserror::Error;

/// Errors raised while loading the app config or the site registry.
///
/// All of them are fatal: no run starts with a broken configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("failed to parse JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// `${NAME}` or `${NAME:-fallback}`.
static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("env reference pattern is valid")
});

/// Parse a human-readable duration such as `10s`, `250ms` or `5m`.
///
/// Used as the clap value parser for `--timeout`, so errors are plain strings.
///
/// ```
/// use vantage::config::parse_duration;
///
/// assert_eq!(parse_duration("250ms").unwrap().as_millis(), 250);
/// assert!(parse_duration("10").is_err());
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    match s.trim() {
        "" => Err("duration string is empty".to_string()),
        trimmed => humantime::parse_duration(trimmed).map_err(|e| e.to_string()),
    }
}

/// Substitute `${NAME}` / `${NAME:-fallback}` references from the process
/// environment. Unset variables without a fallback become empty.
pub fn expand_env_vars(input: &str) -> String {
    ENV_REFERENCE
        .replace_all(input, |caps: &Captures| {
            std::env::var(&caps[1])
                .unwrap_or_else(|_| caps.get(2).map_or("", |m| m.as_str()).to_string())
        })
        .into_owned()
}

/// Reject a request header that the HTTP client would refuse to send.
pub(crate) fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
        ConfigError::ValidationError(format!("probe header: invalid name '{}'", name))
    })?;
    HeaderValue::from_str(value).map_err(|_| {
        ConfigError::ValidationError(format!("probe header '{}': invalid value", name))
    })?;
    Ok(())
}
