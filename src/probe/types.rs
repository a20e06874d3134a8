//! Endpoint and probe result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::classify::{QualityTier, classify};

/// Error detail used when a failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "connection failed";

/// Endpoint category.
///
/// Variant order is the order in which categories are probed and displayed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    /// Company-internal infrastructure.
    Internal,
    /// Commonly used domestic services.
    Domestic,
    /// Commonly used overseas services.
    Overseas,
}

impl Category {
    /// All categories in probe order.
    pub const ALL: [Category; 3] = [Self::Internal, Self::Domestic, Self::Overseas];

    /// Human-readable heading.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Internal => "Internal sites",
            Self::Domestic => "Domestic sites",
            Self::Overseas => "Overseas sites",
        }
    }

    /// One-line description shown under the heading.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Internal => "Company network services",
            Self::Domestic => "Commonly used mainland sites",
            Self::Overseas => "Commonly used overseas services",
        }
    }
}

/// A monitored endpoint as listed in the site registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Display name, unique within its category.
    pub name: String,
    /// Absolute HTTP(S) URL.
    pub url: String,
    /// Category the endpoint is grouped under.
    pub category: Category,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(name: impl Into<String>, url: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            category,
        }
    }
}

/// Outcome of a single probe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProbeStatus {
    Success,
    Error,
}

/// Result of probing one endpoint once.
///
/// Created exactly once per probe and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub name: String,
    pub url: String,
    pub category: Category,
    /// Wall-clock duration of the attempt, rounded to whole milliseconds.
    pub latency_ms: u64,
    pub status: ProbeStatus,
    /// Empty unless `status` is [`ProbeStatus::Error`].
    #[serde(default)]
    pub error_detail: String,
    pub measured_at: DateTime<Utc>,
}

impl ProbeResult {
    /// Record a successful probe.
    pub fn success(endpoint: &Endpoint, latency_ms: u64) -> Self {
        Self {
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            category: endpoint.category,
            latency_ms,
            status: ProbeStatus::Success,
            error_detail: String::new(),
            measured_at: Utc::now(),
        }
    }

    /// Record a failed probe.
    ///
    /// An empty `detail` is replaced with [`GENERIC_FAILURE`].
    pub fn failure(endpoint: &Endpoint, latency_ms: u64, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let detail = if detail.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            detail
        };

        Self {
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            category: endpoint.category,
            latency_ms,
            status: ProbeStatus::Error,
            error_detail: detail,
            measured_at: Utc::now(),
        }
    }

    /// Whether the probe succeeded.
    pub fn is_success(&self) -> bool {
        self.status == ProbeStatus::Success
    }

    /// Quality tier, derived on demand.
    pub fn tier(&self) -> QualityTier {
        classify(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Endpoint {
        Endpoint::new("Router", "http://10.0.0.1", Category::Internal)
    }

    #[test]
    fn test_category_order() {
        assert!(Category::Internal < Category::Domestic);
        assert!(Category::Domestic < Category::Overseas);
        assert_eq!(
            Category::ALL,
            [Category::Internal, Category::Domestic, Category::Overseas]
        );
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("internal".parse::<Category>().ok(), Some(Category::Internal));
        assert_eq!("overseas".parse::<Category>().ok(), Some(Category::Overseas));
        assert!("external".parse::<Category>().is_err());
        assert_eq!(Category::Domestic.as_ref(), "domestic");
    }

    #[test]
    fn test_category_deserialize_rejects_unknown() {
        let result = serde_json::from_str::<Category>("\"intranet\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_success_result() {
        let result = ProbeResult::success(&router(), 42);
        assert_eq!(result.name, "Router");
        assert_eq!(result.category, Category::Internal);
        assert_eq!(result.latency_ms, 42);
        assert!(result.is_success());
        assert!(result.error_detail.is_empty());
    }

    #[test]
    fn test_failure_result_keeps_detail() {
        let result = ProbeResult::failure(&router(), 7, "connection refused");
        assert_eq!(result.status, ProbeStatus::Error);
        assert_eq!(result.error_detail, "connection refused");
        assert_eq!(result.latency_ms, 7);
    }

    #[test]
    fn test_failure_result_generic_fallback() {
        let result = ProbeResult::failure(&router(), 3, "  ");
        assert_eq!(result.error_detail, GENERIC_FAILURE);
    }
}
