//! Sink holding the latest dashboard snapshot.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{PresentationSink, SiteUpdate};
use crate::probe::Category;
use crate::run::RunPlan;
use crate::summary::SummaryCounts;

/// Dashboard run state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// No run has started yet.
    #[default]
    Idle,
    Running,
    Complete,
}

/// One endpoint on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteView {
    pub name: String,
    pub url: String,
    pub category: Category,
    /// `None` while the probe is pending.
    pub result: Option<SiteUpdate>,
}

/// Point-in-time view of the current run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub state: RunState,
    /// Sites in plan order.
    pub sites: Vec<SiteView>,
    pub summary: Option<SummaryCounts>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Sites grouped by category, omitting empty categories.
    pub fn categories(&self) -> Vec<(Category, Vec<&SiteView>)> {
        Category::ALL
            .iter()
            .map(|category| {
                let sites = self
                    .sites
                    .iter()
                    .filter(|site| site.category == *category)
                    .collect::<Vec<_>>();
                (*category, sites)
            })
            .filter(|(_, sites)| !sites.is_empty())
            .collect()
    }

    /// Number of sites still waiting for a result.
    pub fn pending(&self) -> usize {
        self.sites.iter().filter(|site| site.result.is_none()).count()
    }
}

/// Keeps the snapshot of the newest run it has seen.
///
/// Callbacks tagged with any other generation are dropped.
#[derive(Debug, Default)]
pub struct SnapshotSink {
    inner: RwLock<Snapshot>,
}

impl SnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PresentationSink for SnapshotSink {
    fn run_started(&self, plan: &RunPlan) {
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if plan.generation() < snapshot.generation {
            return;
        }

        *snapshot = Snapshot {
            generation: plan.generation(),
            state: RunState::Running,
            sites: plan
                .endpoints()
                .iter()
                .map(|endpoint| SiteView {
                    name: endpoint.name.clone(),
                    url: endpoint.url.clone(),
                    category: endpoint.category,
                    result: None,
                })
                .collect(),
            summary: None,
            updated_at: Some(Utc::now()),
        };
    }

    fn site_completed(&self, update: &SiteUpdate) {
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if update.generation != snapshot.generation {
            tracing::debug!(
                generation = update.generation,
                current = snapshot.generation,
                "Dropping stale site update"
            );
            return;
        }

        if let Some(site) = snapshot.sites.get_mut(update.slot) {
            site.result = Some(update.clone());
            snapshot.updated_at = Some(Utc::now());
        }
    }

    fn run_completed(&self, generation: u64, summary: &SummaryCounts) {
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if generation != snapshot.generation {
            return;
        }

        snapshot.state = RunState::Complete;
        snapshot.summary = Some(*summary);
        snapshot.updated_at = Some(Utc::now());
    }
}
