//! Core probe trait and error types.

use std::io::ErrorKind;
use std::time::Duration;

use thiserror::Error;

use super::types::{Endpoint, GENERIC_FAILURE, ProbeResult};

/// Reasons a single probe can fail.
///
/// These never escape a probe: their `Display` text becomes the
/// `error_detail` of the recorded [`ProbeResult`].
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Endpoint URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// No response within the probe timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Response status was not accepted by the reachability policy.
    #[error("HTTP {0}")]
    Status(u16),

    /// Connection-level failure (DNS, refused, reset, TLS, ...).
    #[error("{0}")]
    Transport(String),

    /// HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(String),
}

impl ProbeError {
    /// Classify a `reqwest` transport error.
    pub fn from_transport(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout(timeout);
        }
        Self::Transport(describe_transport_error(err))
    }
}

/// Short description of a transport error.
///
/// Well-known socket errors map to fixed phrases; anything else uses the
/// innermost message in the source chain.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let mut innermost = err.to_string();
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);

    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            match io.kind() {
                ErrorKind::ConnectionRefused => return "connection refused".to_string(),
                ErrorKind::ConnectionReset => return "connection reset".to_string(),
                ErrorKind::ConnectionAborted => return "connection aborted".to_string(),
                _ => {}
            }
        }
        let message = current.to_string();
        if !message.trim().is_empty() {
            innermost = message;
        }
        source = current.source();
    }

    if innermost.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        innermost
    }
}

/// Executes one reachability measurement.
///
/// # Error Handling Philosophy
///
/// `probe()` is infallible by signature. Unreachable targets, timeouts and
/// rejected responses are valid observations and come back as a
/// [`ProbeResult`] with `status: error`. Implementations must measure latency
/// up to the point of failure and must not retry.
#[async_trait::async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Probe a single endpoint once.
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;
}
