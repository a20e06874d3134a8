//! Web server module for Vantage.
//!
//! Serves the dashboard and a small JSON API:
//!
//! - `GET /`: dashboard page
//! - `GET /healthz`: liveness probe
//! - `GET /api/results`: snapshot of the current run
//! - `POST /api/runs`: start a new run, superseding one in flight

use std::sync::Arc;

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::classify::QualityTier;
use crate::probe::ProbeStatus;
use crate::run::Coordinator;
use crate::sink::{RunState, SiteView, Snapshot, SnapshotSink};
use crate::summary::SummaryCounts;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub snapshot: Arc<SnapshotSink>,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    sites: usize,
}

/// Response to a run trigger.
#[derive(Serialize)]
struct TriggerResponse {
    generation: u64,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    running: bool,
    generation: u64,
    groups: Vec<CategoryGroup>,
    summary: SummaryCounts,
}

struct CategoryGroup {
    label: &'static str,
    description: &'static str,
    sites: Vec<SiteRow>,
}

struct SiteRow {
    name: String,
    url: String,
    badge: String,
    badge_class: &'static str,
    detail: String,
}

impl SiteRow {
    fn from_view(site: &SiteView) -> Self {
        let (badge, badge_class, detail) = match &site.result {
            None => ("testing...".to_string(), "pending", "Connecting...".to_string()),
            Some(update) if update.status == ProbeStatus::Error => (
                "failed".to_string(),
                "error",
                update.error_detail.clone(),
            ),
            Some(update) => {
                let latency = format!("{}ms", update.latency_ms.unwrap_or_default());
                let class = match update.tier {
                    QualityTier::Good => "good",
                    QualityTier::Moderate => "moderate",
                    QualityTier::Poor => "poor",
                };
                (latency.clone(), class, latency)
            }
        };

        Self {
            name: site.name.clone(),
            url: site.url.clone(),
            badge,
            badge_class,
            detail,
        }
    }
}

impl DashboardTemplate {
    fn from_snapshot(snapshot: &Snapshot) -> Self {
        let groups = snapshot
            .categories()
            .into_iter()
            .map(|(category, sites)| CategoryGroup {
                label: category.label(),
                description: category.description(),
                sites: sites.into_iter().map(SiteRow::from_view).collect(),
            })
            .collect();

        Self {
            running: snapshot.state == RunState::Running,
            generation: snapshot.generation,
            groups,
            summary: snapshot.summary.unwrap_or_default(),
        }
    }
}

/// Wrapper to render Askama templates as Axum responses.
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(rendered) => Html(rendered).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Template render failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let app_state = Arc::new(state);

    Router::new()
        .route("/", get(dashboard_handler))
        .route("/healthz", get(healthz_handler))
        .route("/api/results", get(results_handler))
        .route("/api/runs", post(trigger_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Dashboard homepage handler.
async fn dashboard_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    HtmlTemplate(DashboardTemplate::from_snapshot(&state.snapshot.snapshot()))
}

/// Liveness probe.
async fn healthz_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sites: state.coordinator.registry().len(),
    })
}

/// Current run snapshot as JSON.
async fn results_handler(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.snapshot.snapshot())
}

/// Start a new run.
async fn trigger_handler(State(state): State<Arc<AppState>>) -> Response {
    let generation = state.coordinator.trigger();
    tracing::info!(generation, "Run triggered via API");
    (StatusCode::ACCEPTED, Json(TriggerResponse { generation })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteRegistry;
    use crate::probe::{Category, Endpoint, ProbeResult, Prober};
    use crate::run::RunPlan;
    use crate::sink::{PresentationSink, SiteUpdate};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct InstantProber;

    #[async_trait::async_trait]
    impl Prober for InstantProber {
        async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
            ProbeResult::success(endpoint, 42)
        }
    }

    fn sites() -> Vec<Endpoint> {
        vec![
            Endpoint::new("Router", "http://10.0.0.1", Category::Internal),
            Endpoint::new("Google", "https://www.google.com", Category::Overseas),
        ]
    }

    fn create_test_state() -> AppState {
        let snapshot = Arc::new(SnapshotSink::new());
        let coordinator = Arc::new(Coordinator::new(
            SiteRegistry::new(sites()),
            Arc::new(InstantProber),
            snapshot.clone(),
        ));
        AppState {
            coordinator,
            snapshot,
        }
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_site_row_states() {
        let endpoint = Endpoint::new("Router", "http://10.0.0.1", Category::Internal);
        let mut view = SiteView {
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            category: endpoint.category,
            result: None,
        };
        assert_eq!(SiteRow::from_view(&view).badge_class, "pending");

        view.result = Some(SiteUpdate::new(1, 0, &ProbeResult::success(&endpoint, 150)));
        let row = SiteRow::from_view(&view);
        assert_eq!(row.badge, "150ms");
        assert_eq!(row.badge_class, "moderate");

        view.result = Some(SiteUpdate::new(
            1,
            0,
            &ProbeResult::failure(&endpoint, 3, "connection refused"),
        ));
        let row = SiteRow::from_view(&view);
        assert_eq!(row.badge, "failed");
        assert_eq!(row.badge_class, "error");
        assert_eq!(row.detail, "connection refused");
    }

    #[tokio::test]
    async fn test_dashboard_renders_pending_sites() {
        let state = create_test_state();
        state
            .snapshot
            .run_started(&RunPlan::new(1, state.coordinator.registry().sites()));
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Internal sites"));
        assert!(body.contains("Overseas sites"));
        assert!(!body.contains("Domestic sites"));
        assert!(body.contains("Router"));
        assert!(body.contains("testing..."));
    }

    #[tokio::test]
    async fn test_healthz() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sites"], 2);
    }

    #[tokio::test]
    async fn test_results_idle_before_first_run() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(Request::builder().uri("/api/results").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["state"], "idle");
        assert_eq!(body["generation"], 0);
    }

    #[tokio::test]
    async fn test_trigger_returns_accepted() {
        let state = create_test_state();
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/runs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["generation"], 1);
        assert_eq!(state.coordinator.current_generation(), 1);
    }
}
