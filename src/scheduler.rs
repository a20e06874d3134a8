//! Scheduled test runs.
//!
//! Uses `tokio-cron-scheduler` to call [`Coordinator::trigger`] on a fixed
//! interval or a cron expression. Each tick starts a fresh run and
//! supersedes one still in flight.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::run::Coordinator;

/// Minimum allowed interval (1 second).
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Default timeout for graceful shutdown (5 seconds).
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while scheduling runs.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Cron expression could not be parsed.
    #[error("invalid cron expression: {0}")]
    InvalidCron(String),

    /// Scheduler backend error.
    #[error("scheduler error: {0}")]
    Scheduler(String),
}

/// Schedule for automatic runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Fixed interval between runs.
    ///
    /// Interval is clamped to a minimum of 1 second.
    Interval(Duration),

    /// Cron expression, 6-field: `sec min hour day month weekday`.
    /// Example: `"0 */5 * * * *"` = every 5 minutes at second 0
    Cron(String),
}

impl Schedule {
    /// Create an interval schedule.
    ///
    /// Interval is clamped to a minimum of 1 second.
    pub fn interval(duration: Duration) -> Self {
        if duration < MIN_INTERVAL {
            tracing::warn!(min_interval = ?MIN_INTERVAL,
                "Interval duration is less than minimum allowed. Using minimum duration."
            );
            Self::Interval(MIN_INTERVAL)
        } else {
            Self::Interval(duration)
        }
    }

    /// Create a cron schedule with immediate validation.
    ///
    /// # Errors
    /// Returns `SchedulerError::InvalidCron` if the expression is invalid.
    pub fn cron(expr: impl AsRef<str>) -> Result<Self, SchedulerError> {
        use std::str::FromStr;

        let expr = expr.as_ref();
        cron::Schedule::from_str(expr).map_err(|e| SchedulerError::InvalidCron(e.to_string()))?;

        Ok(Self::Cron(expr.to_string()))
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interval(d) => write!(f, "every {:?}", d),
            Self::Cron(expr) => write!(f, "cron: {}", expr),
        }
    }
}

/// Triggers runs on a schedule.
pub struct RunScheduler {
    scheduler: JobScheduler,
    job_id: Option<uuid::Uuid>,
}

impl RunScheduler {
    /// Create a new, idle scheduler.
    pub async fn new() -> Result<Self, SchedulerError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;

        Ok(Self {
            scheduler,
            job_id: None,
        })
    }

    /// Register the run job. Replaces a previously registered job.
    pub async fn schedule(
        &mut self,
        schedule: &Schedule,
        coordinator: Arc<Coordinator>,
    ) -> Result<uuid::Uuid, SchedulerError> {
        if let Some(previous) = self.job_id.take() {
            self.scheduler
                .remove(&previous)
                .await
                .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;
        }

        let job = create_job(schedule, coordinator)?;
        let job_id = self
            .scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;

        self.job_id = Some(job_id);
        tracing::info!(job_id = %job_id, schedule = %schedule, "Scheduled test runs");
        Ok(job_id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::Scheduler(e.to_string()))?;
        tracing::info!("Run scheduler started");
        Ok(())
    }

    /// Id of the registered job, if any.
    pub fn job_id(&self) -> Option<uuid::Uuid> {
        self.job_id
    }

    /// Gracefully shutdown the scheduler with default timeout.
    pub async fn shutdown(self) -> Result<(), SchedulerError> {
        self.shutdown_with_timeout(DEFAULT_SHUTDOWN_TIMEOUT).await
    }

    /// Shutdown with custom timeout.
    pub async fn shutdown_with_timeout(mut self, timeout: Duration) -> Result<(), SchedulerError> {
        match tokio::time::timeout(timeout, self.scheduler.shutdown()).await {
            Ok(Ok(())) => {
                tracing::info!("Run scheduler shutdown complete");
                Ok(())
            }
            Ok(Err(e)) => Err(SchedulerError::Scheduler(e.to_string())),
            Err(_) => {
                tracing::warn!("Run scheduler shutdown timed out");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for RunScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunScheduler")
            .field("job_id", &self.job_id)
            .finish_non_exhaustive()
    }
}

fn create_job(schedule: &Schedule, coordinator: Arc<Coordinator>) -> Result<Job, SchedulerError> {
    let callback = move |_: uuid::Uuid, _: JobScheduler| {
        let coordinator = Arc::clone(&coordinator);
        Box::pin(async move {
            let generation = coordinator.trigger();
            tracing::debug!(generation, "Scheduled run triggered");
        }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
    };

    match schedule {
        Schedule::Interval(d) => Job::new_repeated_async(*d, callback),
        Schedule::Cron(expr) => Job::new_cron_job_async(expr.as_str(), callback),
    }
    .map_err(|e| SchedulerError::Scheduler(e.to_string()))
}
