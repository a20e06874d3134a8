//! Summary counts over a set of probe results.

use serde::{Deserialize, Serialize};

use crate::classify::{QualityTier, classify};
use crate::probe::ProbeResult;
use crate::run::TestRun;

/// Per-tier counts for one run.
///
/// Always recomputed from the full result set; `good + moderate + poor == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub total: usize,
    pub good: usize,
    pub moderate: usize,
    pub poor: usize,
}

impl SummaryCounts {
    /// Count tiers over any collection of results.
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a ProbeResult>,
    {
        results
            .into_iter()
            .map(classify)
            .fold(Self::default(), |mut counts, tier| {
                counts.record(tier);
                counts
            })
    }

    fn record(&mut self, tier: QualityTier) {
        self.total += 1;
        match tier {
            QualityTier::Good => self.good += 1,
            QualityTier::Moderate => self.moderate += 1,
            QualityTier::Poor => self.poor += 1,
        }
    }
}

/// Summarize a (complete or partial) test run.
pub fn summarize(run: &TestRun) -> SummaryCounts {
    SummaryCounts::from_results(run.iter())
}
