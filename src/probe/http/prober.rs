//! HTTP endpoint probe.
//!
//! Measures request round-trip latency and interprets the response according
//! to a [`ReachabilityPolicy`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use url::Url;

use crate::probe::{Endpoint, ProbeError, ProbeResult, Prober};

/// Default request timeout (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default name of the cache-busting query parameter.
pub const DEFAULT_CACHE_BUST_PARAM: &str = "_";

fn default_method() -> HttpMethod {
    HttpMethod::Head
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_cache_bust_param() -> String {
    DEFAULT_CACHE_BUST_PARAM.to_string()
}

/// HTTP method used for probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Head,
    Get,
}

impl HttpMethod {
    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Head => reqwest::Method::HEAD,
            Self::Get => reqwest::Method::GET,
        }
    }
}

/// How a received HTTP response is interpreted.
///
/// `AnyResponse` is best-effort reachability: getting any response at all
/// counts as success, regardless of status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachabilityPolicy {
    /// 2xx and 3xx are success; anything else is recorded as `HTTP <code>`.
    #[default]
    Status,
    /// Any response is success.
    AnyResponse,
}

impl ReachabilityPolicy {
    /// Evaluate a response status.
    pub fn evaluate(&self, status: StatusCode) -> Result<(), ProbeError> {
        match self {
            Self::AnyResponse => Ok(()),
            Self::Status if status.is_success() || status.is_redirection() => Ok(()),
            Self::Status => Err(ProbeError::Status(status.as_u16())),
        }
    }
}

/// Configuration for the HTTP probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpProbeConfig {
    /// HTTP method to use (default: HEAD).
    #[serde(default = "default_method")]
    pub method: HttpMethod,
    /// Per-probe timeout (default: 10s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// Response interpretation (default: status).
    #[serde(default)]
    pub policy: ReachabilityPolicy,
    /// Query parameter carrying the cache-busting token (default: "_").
    #[serde(default = "default_cache_bust_param")]
    pub cache_bust_param: String,
    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Accept self-signed or otherwise invalid TLS certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for HttpProbeConfig {
    fn default() -> Self {
        Self {
            method: HttpMethod::default(),
            timeout: DEFAULT_TIMEOUT,
            policy: ReachabilityPolicy::default(),
            cache_bust_param: DEFAULT_CACHE_BUST_PARAM.to_string(),
            headers: BTreeMap::new(),
            accept_invalid_certs: false,
        }
    }
}

impl HttpProbeConfig {
    /// Set the HTTP method.
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the reachability policy.
    pub fn with_policy(mut self, policy: ReachabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Add a single request header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the cache-busting query parameter name.
    pub fn with_cache_bust_param(mut self, param: impl Into<String>) -> Self {
        self.cache_bust_param = param.into();
        self
    }
}

/// Strictly increasing cache-busting tokens seeded from the wall clock.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicU64,
}

impl CacheBuster {
    /// Next token: current Unix time in milliseconds, bumped past the
    /// previous token when called twice within the same millisecond.
    pub fn next_token(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }
}

/// Append `param=token` to the query string of `url`.
pub fn bust_cache(url: &str, param: &str, token: u64) -> Result<Url, url::ParseError> {
    let mut parsed = Url::parse(url)?;
    parsed
        .query_pairs_mut()
        .append_pair(param, &token.to_string());
    Ok(parsed)
}

/// Round a duration to whole milliseconds.
fn round_millis(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

/// HTTP endpoint probe.
///
/// One `HttpProber` is shared by every probe of a run; it holds no
/// per-endpoint state besides the connection pool inside the client.
pub struct HttpProber {
    config: HttpProbeConfig,
    client: Client,
    cache_buster: CacheBuster,
}

impl HttpProber {
    /// Create a new HTTP prober.
    ///
    /// # Errors
    /// Returns `ProbeError::Client` if the HTTP client cannot be built.
    pub fn new(config: HttpProbeConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("vantage/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self {
            config,
            client,
            cache_buster: CacheBuster::default(),
        })
    }
}

impl std::fmt::Debug for HttpProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProber")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let probe_timeout = self.config.timeout;

        let target = match bust_cache(
            &endpoint.url,
            &self.config.cache_bust_param,
            self.cache_buster.next_token(),
        ) {
            Ok(target) => target,
            Err(e) => {
                let err = ProbeError::InvalidUrl(e.to_string());
                tracing::warn!(name = %endpoint.name, url = %endpoint.url, error = %err, "Probe skipped");
                return ProbeResult::failure(endpoint, 0, err.to_string());
            }
        };

        let mut request = self
            .client
            .request(self.config.method.to_reqwest(), target)
            .header(CACHE_CONTROL, "no-store");
        for (key, value) in &self.config.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        // Measure request time
        let start = Instant::now();
        let outcome = timeout(probe_timeout, request.send()).await;
        let latency_ms = round_millis(start.elapsed());

        let verdict = match outcome {
            Ok(Ok(response)) => self.config.policy.evaluate(response.status()),
            Ok(Err(e)) => Err(ProbeError::from_transport(&e, probe_timeout)),
            Err(_) => Err(ProbeError::Timeout(probe_timeout)),
        };

        match verdict {
            Ok(()) => {
                tracing::debug!(
                    name = %endpoint.name,
                    url = %endpoint.url,
                    latency_ms,
                    "HTTP probe successful"
                );
                ProbeResult::success(endpoint, latency_ms)
            }
            Err(err) => {
                tracing::warn!(
                    name = %endpoint.name,
                    url = %endpoint.url,
                    latency_ms,
                    error = %err,
                    "HTTP probe failed"
                );
                ProbeResult::failure(endpoint, latency_ms, err.to_string())
            }
        }
    }
}
