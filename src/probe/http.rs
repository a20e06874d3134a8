//! HTTP probes for HTTP/HTTPS endpoints.
//!
//! - [`HttpProber`]: HTTP endpoint reachability and latency probe

mod prober;

pub use prober::{
    CacheBuster, DEFAULT_CACHE_BUST_PARAM, DEFAULT_TIMEOUT, HttpMethod, HttpProbeConfig,
    HttpProber, ReachabilityPolicy, bust_cache,
};
