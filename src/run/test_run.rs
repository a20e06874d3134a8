//! Run-scoped plan and result set.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::probe::{Category, Endpoint, ProbeResult};
use crate::summary::{SummaryCounts, summarize};

/// Endpoints scheduled for one run, in probe order.
///
/// Probe order is category order first, then registry order within a
/// category. A result's slot is its index in this plan.
#[derive(Debug, Clone)]
pub struct RunPlan {
    generation: u64,
    endpoints: Vec<Endpoint>,
}

impl RunPlan {
    /// Snapshot `sites` into a plan for run `generation`.
    pub fn new(generation: u64, sites: &[Endpoint]) -> Self {
        let endpoints = Category::ALL
            .iter()
            .flat_map(|category| sites.iter().filter(move |site| site.category == *category))
            .cloned()
            .collect();

        Self {
            generation,
            endpoints,
        }
    }

    /// Run generation this plan belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Endpoints in probe order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Results of one complete run, grouped by category.
///
/// Every category is present, possibly with an empty sequence. Within a
/// category results keep registry order.
#[derive(Debug, Clone, Serialize)]
pub struct TestRun {
    pub generation: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    results: BTreeMap<Category, Vec<ProbeResult>>,
}

impl TestRun {
    /// Build a run from results given in registry order.
    pub fn from_results<I>(generation: u64, started_at: DateTime<Utc>, results: I) -> Self
    where
        I: IntoIterator<Item = ProbeResult>,
    {
        let mut grouped: BTreeMap<Category, Vec<ProbeResult>> = Category::ALL
            .iter()
            .map(|category| (*category, Vec::new()))
            .collect();

        for result in results {
            grouped.entry(result.category).or_default().push(result);
        }

        Self {
            generation,
            started_at,
            finished_at: Utc::now(),
            results: grouped,
        }
    }

    /// Results for one category.
    pub fn category(&self, category: Category) -> &[ProbeResult] {
        self.results
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All results in category order.
    pub fn iter(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summary counts for this run.
    pub fn summary(&self) -> SummaryCounts {
        summarize(self)
    }
}
