//! Vantage - Network Connectivity Tester
//!
//! Probes a configured registry of sites over HTTP, measures round-trip
//! latency, classifies each result into a quality tier and reports progress
//! as results arrive. It can be embedded as a library or run with the
//! `vantage` executable.
//!
//! # Architecture
//!
//! - **Probe**: one timed HTTP reachability check per endpoint
//! - **Classify / Summary**: quality tiers and per-run counts
//! - **Run**: the coordinator that sweeps the registry with bounded concurrency
//! - **Sink**: incremental progress reporting (tracing, in-memory snapshot)
//! - **Presentation**: web dashboard, JSON API and plain-text report
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vantage::{Coordinator, HttpProbeConfig, HttpProber, SiteRegistry, TracingSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = SiteRegistry::load("configs/sites.json")?;
//!     let prober = HttpProber::new(HttpProbeConfig::default())?;
//!     let coordinator = Coordinator::new(registry, Arc::new(prober), Arc::new(TracingSink));
//!
//!     let run = coordinator.run().await?;
//!     println!("{}", vantage::report::render_text(&run));
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod probe;
pub mod report;
pub mod run;
pub mod scheduler;
pub mod server;
pub mod sink;
pub mod summary;

pub use classify::{QualityTier, classify};
pub use config::{AppConfig, ConfigError, SiteRegistry};
pub use probe::http::{HttpProbeConfig, HttpProber, ReachabilityPolicy};
pub use probe::{Category, Endpoint, ProbeError, ProbeResult, ProbeStatus, Prober};
pub use run::{Coordinator, RunError, TestRun};
pub use sink::{FanoutSink, PresentationSink, SnapshotSink, TracingSink};
pub use summary::{SummaryCounts, summarize};
