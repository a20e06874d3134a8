//! Run coordinator: drives the prober over the site registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::task::JoinHandle;

use super::test_run::{RunPlan, TestRun};
use crate::config::SiteRegistry;
use crate::probe::{ProbeResult, Prober};
use crate::sink::{PresentationSink, SiteUpdate};

/// Default number of probes in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Errors that end a run early.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    /// A newer run started before this one finished; its results were discarded.
    #[error("run {generation} superseded by a newer run")]
    Superseded { generation: u64 },
}

/// Coordinates test runs over a fixed site registry.
///
/// Probes within a run are independent. Up to `concurrency` run at once and
/// complete in any order, but each result is stored in the slot of its
/// endpoint, so the finished [`TestRun`] always follows registry order.
pub struct Coordinator {
    registry: SiteRegistry,
    prober: Arc<dyn Prober>,
    sink: Arc<dyn PresentationSink>,
    concurrency: usize,
    generation: AtomicU64,
    active: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator with [`DEFAULT_CONCURRENCY`].
    pub fn new(
        registry: SiteRegistry,
        prober: Arc<dyn Prober>,
        sink: Arc<dyn PresentationSink>,
    ) -> Self {
        Self {
            registry,
            prober,
            sink,
            concurrency: DEFAULT_CONCURRENCY,
            generation: AtomicU64::new(0),
            active: Mutex::new(None),
        }
    }

    /// Set the number of probes in flight at once (minimum 1, which probes
    /// strictly sequentially).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Generation of the most recently started run (0 before the first run).
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Run one complete sweep and wait for it.
    ///
    /// # Errors
    /// Returns `RunError::Superseded` if another run started meanwhile.
    pub async fn run(&self) -> Result<TestRun, RunError> {
        let generation = self.next_generation();
        self.execute(generation).await
    }

    /// Start a sweep in the background and return its generation.
    ///
    /// Any sweep still in flight is superseded and its task aborted.
    pub fn trigger(self: &Arc<Self>) -> u64 {
        // Held across allocation and spawn so the newest generation always
        // owns the active slot.
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        let generation = self.next_generation();
        let coordinator = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Err(e) = coordinator.execute(generation).await {
                tracing::debug!(error = %e, "Background run discarded");
            }
        });

        if let Some(previous) = active.replace(handle) {
            previous.abort();
        }

        generation
    }

    // --- Private helpers ---

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn ensure_current(&self, generation: u64) -> Result<(), RunError> {
        let current = self.current_generation();
        if current == generation {
            Ok(())
        } else {
            tracing::debug!(generation, current, "Run superseded");
            Err(RunError::Superseded { generation })
        }
    }

    async fn execute(&self, generation: u64) -> Result<TestRun, RunError> {
        let plan = RunPlan::new(generation, self.registry.sites());
        let started_at = Utc::now();

        tracing::debug!(
            generation,
            endpoints = plan.len(),
            concurrency = self.concurrency,
            "Executing run"
        );
        self.sink.run_started(&plan);

        let mut slots: Vec<Option<ProbeResult>> = vec![None; plan.len()];
        let mut completions = stream::iter(plan.endpoints().to_vec().into_iter().enumerate())
            .map(|(slot, endpoint)| {
                let prober = Arc::clone(&self.prober);
                async move { (slot, prober.probe(&endpoint).await) }
            })
            .buffer_unordered(self.concurrency);

        while let Some((slot, result)) = completions.next().await {
            self.ensure_current(generation)?;
            self.sink
                .site_completed(&SiteUpdate::new(generation, slot, &result));
            slots[slot] = Some(result);
        }

        self.ensure_current(generation)?;
        let run = TestRun::from_results(generation, started_at, slots.into_iter().flatten());
        let summary = run.summary();
        self.sink.run_completed(generation, &summary);

        Ok(run)
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("endpoints", &self.registry.len())
            .field("concurrency", &self.concurrency)
            .field("generation", &self.current_generation())
            .finish_non_exhaustive()
    }
}
