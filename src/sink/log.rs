//! Sink that reports progress through `tracing`.

use super::{PresentationSink, SiteUpdate};
use crate::probe::ProbeStatus;
use crate::run::RunPlan;
use crate::summary::SummaryCounts;

/// Logs run progress as structured events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn run_started(&self, plan: &RunPlan) {
        tracing::info!(
            generation = plan.generation(),
            endpoints = plan.len(),
            "Test run started"
        );
    }

    fn site_completed(&self, update: &SiteUpdate) {
        match update.status {
            ProbeStatus::Success => tracing::info!(
                generation = update.generation,
                category = %update.category,
                name = %update.name,
                latency_ms = update.latency_ms,
                tier = %update.tier,
                "Site reachable"
            ),
            ProbeStatus::Error => tracing::warn!(
                generation = update.generation,
                category = %update.category,
                name = %update.name,
                error = %update.error_detail,
                "Site unreachable"
            ),
        }
    }

    fn run_completed(&self, generation: u64, summary: &SummaryCounts) {
        tracing::info!(
            generation,
            total = summary.total,
            good = summary.good,
            moderate = summary.moderate,
            poor = summary.poor,
            "Test run complete"
        );
    }
}
