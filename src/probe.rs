//! Probe Layer
//!
//! One-shot reachability and latency measurements against configured
//! endpoints. A probe never fails upward: transport errors, timeouts and
//! non-success responses are all recorded on the returned [`ProbeResult`].
//!
//! # Architecture
//!
//! - [`Prober`]: Core trait for implementing probe executors
//! - [`http::HttpProber`]: HTTP/HTTPS probe built on `reqwest`
//! - [`Endpoint`] / [`ProbeResult`]: Input and output records of a probe
//!
//! # Example
//!
//! ```rust,no_run
//! use vantage::probe::{Category, Endpoint, Prober};
//! use vantage::probe::http::{HttpProbeConfig, HttpProber};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let prober = HttpProber::new(HttpProbeConfig::default())?;
//! let router = Endpoint::new("Router", "http://10.0.0.1", Category::Internal);
//! let result = prober.probe(&router).await;
//! println!("{} -> {}ms ({})", result.name, result.latency_ms, result.status);
//! # Ok(())
//! # }
//! ```

pub mod http;
mod traits;
mod types;

pub use traits::{ProbeError, Prober};
pub use types::{Category, Endpoint, GENERIC_FAILURE, ProbeResult, ProbeStatus};
