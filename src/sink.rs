//! Presentation Sinks
//!
//! The run coordinator reports progress through [`PresentationSink`] and
//! never depends on how (or whether) anything is rendered.
//!
//! Callback order for one run:
//!
//! 1. [`PresentationSink::run_started`] with the run plan
//! 2. [`PresentationSink::site_completed`] once per endpoint, in completion order
//! 3. [`PresentationSink::run_completed`] with the final counts
//!
//! A superseded run stops calling its sink as soon as it notices a newer
//! run exists, so sinks only see stale generations for updates that raced
//! with a new run start.

mod log;
mod snapshot;

use std::sync::Arc;

use serde::Serialize;

use crate::classify::{QualityTier, classify};
use crate::probe::{Category, ProbeResult, ProbeStatus};
use crate::run::RunPlan;
use crate::summary::SummaryCounts;

pub use log::TracingSink;
pub use snapshot::{RunState, SiteView, Snapshot, SnapshotSink};

/// A classified per-site result as emitted to sinks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteUpdate {
    pub generation: u64,
    /// Position of the endpoint in the run plan.
    pub slot: usize,
    pub name: String,
    pub url: String,
    pub category: Category,
    pub status: ProbeStatus,
    /// `None` when the probe failed.
    pub latency_ms: Option<u64>,
    pub error_detail: String,
    pub tier: QualityTier,
}

impl SiteUpdate {
    /// Build the update for `result` at plan position `slot`.
    pub fn new(generation: u64, slot: usize, result: &ProbeResult) -> Self {
        Self {
            generation,
            slot,
            name: result.name.clone(),
            url: result.url.clone(),
            category: result.category,
            status: result.status,
            latency_ms: result.is_success().then_some(result.latency_ms),
            error_detail: result.error_detail.clone(),
            tier: classify(result),
        }
    }
}

/// Consumer of run progress.
pub trait PresentationSink: Send + Sync + 'static {
    /// A run has started; every endpoint in `plan` is pending.
    fn run_started(&self, _plan: &RunPlan) {}

    /// One endpoint has a result.
    fn site_completed(&self, update: &SiteUpdate);

    /// Every endpoint of run `generation` has a result.
    fn run_completed(&self, generation: u64, summary: &SummaryCounts);
}

/// Forwards every callback to several sinks, in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn PresentationSink>>,
}

impl FanoutSink {
    /// Add a sink.
    pub fn with(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl PresentationSink for FanoutSink {
    fn run_started(&self, plan: &RunPlan) {
        for sink in &self.sinks {
            sink.run_started(plan);
        }
    }

    fn site_completed(&self, update: &SiteUpdate) {
        for sink in &self.sinks {
            sink.site_completed(update);
        }
    }

    fn run_completed(&self, generation: u64, summary: &SummaryCounts) {
        for sink in &self.sinks {
            sink.run_completed(generation, summary);
        }
    }
}
