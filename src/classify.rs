//! Quality tier classification.
//!
//! A tier is always derived from a [`ProbeResult`] and never stored on it.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::probe::{ProbeResult, ProbeStatus};

/// Successful probes faster than this are `good`.
pub const GOOD_BELOW_MS: u64 = 100;

/// Successful probes faster than this (and not `good`) are `moderate`.
pub const MODERATE_BELOW_MS: u64 = 300;

/// Connection quality tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QualityTier {
    Good,
    Moderate,
    Poor,
}

/// Classify a probe result.
pub fn classify(result: &ProbeResult) -> QualityTier {
    classify_measurement(result.status, result.latency_ms)
}

/// Classify a raw `(status, latency)` measurement.
///
/// Bands are inclusive on their lower bound: 100ms is `moderate`,
/// 300ms is `poor`. Errors are `poor` regardless of latency.
pub fn classify_measurement(status: ProbeStatus, latency_ms: u64) -> QualityTier {
    match status {
        ProbeStatus::Error => QualityTier::Poor,
        ProbeStatus::Success if latency_ms < GOOD_BELOW_MS => QualityTier::Good,
        ProbeStatus::Success if latency_ms < MODERATE_BELOW_MS => QualityTier::Moderate,
        ProbeStatus::Success => QualityTier::Poor,
    }
}
