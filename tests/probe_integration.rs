//! HTTP Probe Integration Tests
//!
//! Runs the real `HttpProber` against a local axum server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use tokio::net::TcpListener;
use vantage::probe::http::HttpMethod;
use vantage::{
    Category, Coordinator, Endpoint, HttpProbeConfig, HttpProber, ProbeStatus, Prober,
    QualityTier, ReachabilityPolicy, SiteRegistry, TracingSink,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// Requests seen by the test server: (query, cache-control header).
type Seen = Arc<Mutex<Vec<(Option<String>, Option<String>)>>>;

async fn record(
    State(seen): State<Seen>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> &'static str {
    let cache_control = headers
        .get("cache-control")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().push((query, cache_control));
    "ok"
}

/// Start a test target server and return its base URL.
async fn start_target() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/ok", get(record))
        .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/moved", get(|| async { StatusCode::MOVED_PERMANENTLY }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        )
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://{}", addr), seen)
}

/// A URL on a port nobody listens on.
async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

fn endpoint(name: &str, url: String) -> Endpoint {
    Endpoint::new(name, url, Category::Internal)
}

// =============================================================================
// Probe Outcomes
// =============================================================================

#[tokio::test]
async fn test_probe_success() {
    let (base_url, _) = start_target().await;
    let prober = HttpProber::new(HttpProbeConfig::default()).unwrap();

    let result = prober.probe(&endpoint("ok", format!("{}/ok", base_url))).await;

    assert_eq!(result.status, ProbeStatus::Success);
    assert!(result.error_detail.is_empty());
    assert_ne!(result.tier(), QualityTier::Poor);
}

#[tokio::test]
async fn test_probe_redirect_counts_as_reachable() {
    let (base_url, _) = start_target().await;
    let prober = HttpProber::new(HttpProbeConfig::default()).unwrap();

    let result = prober
        .probe(&endpoint("moved", format!("{}/moved", base_url)))
        .await;

    assert_eq!(result.status, ProbeStatus::Success);
}

#[tokio::test]
async fn test_probe_error_status() {
    let (base_url, _) = start_target().await;
    let prober = HttpProber::new(HttpProbeConfig::default()).unwrap();

    let result = prober
        .probe(&endpoint("down", format!("{}/down", base_url)))
        .await;

    assert_eq!(result.status, ProbeStatus::Error);
    assert_eq!(result.error_detail, "HTTP 503");
    assert_eq!(result.tier(), QualityTier::Poor);
}

#[tokio::test]
async fn test_probe_any_response_policy() {
    let (base_url, _) = start_target().await;
    let config = HttpProbeConfig::default().with_policy(ReachabilityPolicy::AnyResponse);
    let prober = HttpProber::new(config).unwrap();

    let result = prober
        .probe(&endpoint("down", format!("{}/down", base_url)))
        .await;

    assert_eq!(result.status, ProbeStatus::Success);
}

#[tokio::test]
async fn test_probe_connection_refused() {
    let prober = HttpProber::new(HttpProbeConfig::default()).unwrap();

    let result = prober.probe(&endpoint("closed", closed_port_url().await)).await;

    assert_eq!(result.status, ProbeStatus::Error);
    assert_eq!(result.error_detail, "connection refused");
}

#[tokio::test]
async fn test_probe_timeout() {
    let (base_url, _) = start_target().await;
    let config = HttpProbeConfig::default().with_timeout(Duration::from_millis(100));
    let prober = HttpProber::new(config).unwrap();

    let result = prober
        .probe(&endpoint("slow", format!("{}/slow", base_url)))
        .await;

    assert_eq!(result.status, ProbeStatus::Error);
    assert_eq!(result.error_detail, "timed out after 100ms");
    assert!(result.latency_ms >= 100);
    assert!(result.latency_ms < 2000);
}

#[tokio::test]
async fn test_probe_busts_caches() {
    let (base_url, seen) = start_target().await;
    let config = HttpProbeConfig::default().with_method(HttpMethod::Get);
    let prober = HttpProber::new(config).unwrap();
    let target = endpoint("ok", format!("{}/ok", base_url));

    prober.probe(&target).await;
    prober.probe(&target).await;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);

    let tokens: Vec<u64> = seen
        .iter()
        .map(|(query, cache_control)| {
            assert_eq!(cache_control.as_deref(), Some("no-store"));
            let query = query.as_deref().expect("query string missing");
            query
                .strip_prefix("_=")
                .expect("cache-bust parameter missing")
                .parse()
                .unwrap()
        })
        .collect();
    assert!(tokens[1] > tokens[0]);
}

// =============================================================================
// Full Run
// =============================================================================

#[tokio::test]
async fn test_coordinator_run_with_http_prober() {
    let (base_url, _) = start_target().await;
    let registry = SiteRegistry::new(vec![
        Endpoint::new("Overseas", format!("{}/down", base_url), Category::Overseas),
        Endpoint::new("Router", format!("{}/ok", base_url), Category::Internal),
        Endpoint::new("Refused", closed_port_url().await, Category::Domestic),
    ]);
    registry.validate().unwrap();

    let prober = HttpProber::new(HttpProbeConfig::default()).unwrap();
    let coordinator =
        Coordinator::new(registry, Arc::new(prober), Arc::new(TracingSink)).with_concurrency(2);

    let run = coordinator.run().await.unwrap();

    assert_eq!(run.len(), 3);
    assert_eq!(run.category(Category::Internal)[0].status, ProbeStatus::Success);
    assert_eq!(run.category(Category::Domestic)[0].error_detail, "connection refused");
    assert_eq!(run.category(Category::Overseas)[0].error_detail, "HTTP 503");

    let summary = run.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.good + summary.moderate, 1);
    assert_eq!(summary.poor, 2);
}
