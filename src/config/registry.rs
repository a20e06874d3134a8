//! Site registry: the list of monitored endpoints.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use super::validation::{ConfigError, expand_env_vars};
use crate::probe::Endpoint;

/// Monitored endpoints, loaded once before the first run.
///
/// Document shape (JSON or YAML):
///
/// ```json
/// { "sites": [ { "name": "Router", "url": "http://10.0.0.1", "category": "internal" } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteRegistry {
    sites: Vec<Endpoint>,
}

impl SiteRegistry {
    /// Wrap a list of endpoints without validating it.
    pub fn new(sites: Vec<Endpoint>) -> Self {
        Self { sites }
    }

    /// Load and validate a registry document.
    ///
    /// Files ending in `.yaml`/`.yml` are parsed as YAML, everything else
    /// as JSON. `${VAR}` references in URLs are expanded.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file is missing, malformed, or invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let registry = match ext {
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            _ => Self::from_json_str(&content)?,
        };

        tracing::debug!(
            path = %path.display(),
            sites = registry.len(),
            "Loaded site registry"
        );
        Ok(registry)
    }

    /// Parse and validate a JSON registry document.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let registry: Self = serde_json::from_str(content)?;
        registry.finish()
    }

    /// Parse and validate a YAML registry document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let registry: Self = serde_yaml::from_str(content)?;
        registry.finish()
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        for site in &mut self.sites {
            site.url = expand_env_vars(&site.url);
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate every endpoint.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` on an empty name, a URL that
    /// is not an absolute `http`/`https` URL, or a duplicate name within a
    /// category.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for site in &self.sites {
            if site.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "site name cannot be empty (url '{}')",
                    site.url
                )));
            }

            let url = Url::parse(&site.url).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "site '{}': invalid URL '{}': {}",
                    site.name, site.url, e
                ))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::ValidationError(format!(
                    "site '{}': unsupported URL scheme '{}'",
                    site.name,
                    url.scheme()
                )));
            }

            if !seen.insert((site.category, site.name.as_str())) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate site name '{}' in category '{}'",
                    site.name, site.category
                )));
            }
        }

        Ok(())
    }

    /// All endpoints in registry order.
    pub fn sites(&self) -> &[Endpoint] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
