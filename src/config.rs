//! Configuration module for Vantage.
//!
//! Provides loading and validation for:
//! - Application settings (YAML): server, probe, concurrency, refresh schedule
//! - The site registry (JSON or YAML): the list of monitored endpoints

mod app;
mod registry;
mod validation;

pub use app::{AppConfig, DEFAULT_SITES_PATH, RefreshConfig, ServerConfig};
pub use registry::SiteRegistry;
pub use validation::{ConfigError, expand_env_vars, parse_duration};
