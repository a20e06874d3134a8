//! Test Runs
//!
//! A run is one sweep over every endpoint in the site registry. Each run
//! owns its own result set and is tagged with a generation number; starting
//! a new run supersedes any run still in flight.
//!
//! - [`Coordinator`]: Drives probes over the registry and reports to a sink
//! - [`RunPlan`]: Endpoints of one run in probe order
//! - [`TestRun`]: Completed results grouped by category

mod coordinator;
mod test_run;

pub use coordinator::{Coordinator, DEFAULT_CONCURRENCY, RunError};
pub use test_run::{RunPlan, TestRun};
