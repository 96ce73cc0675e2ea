//! Dashboard — Axum web server exposing the latest cycle reports.
//!
//! Read-only REST API. CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use routes::AppState;

/// Bind the dashboard port and serve in a background task.
pub async fn spawn_dashboard(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;
    info!(port, "Dashboard server starting on http://localhost:{port}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Dashboard server error");
        }
    });

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/status", get(routes::get_status))
        .route("/api/reports", get(routes::get_reports))
        .route("/api/reports/:resolution", get(routes::get_report))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::notifier::Alert;
    use crate::engine::report::CycleReport;
    use crate::types::MetricsMap;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use routes::DashboardState;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn report(resolution: &str) -> CycleReport {
        CycleReport {
            cycle_id: uuid::Uuid::new_v4(),
            resolution: resolution.to_string(),
            timestamp: chrono::Utc::now(),
            currencies: Vec::new(),
            shortlist: Vec::new(),
            alerts: vec![Alert::Shortfall { found: 0 }],
            metrics: MetricsMap::new(),
            skipped: Vec::new(),
        }
    }

    async fn test_state() -> AppState {
        let state = Arc::new(DashboardState::new("PULSE-TEST"));
        state.publish(report("30min")).await;
        state
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state().await);
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let (status, json) = get_json(build_router(test_state().await), "/api/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["scanner"], "PULSE-TEST");
        assert_eq!(json["cycles_run"], 1);
        assert_eq!(json["resolutions"][0], "30min");
    }

    #[tokio::test]
    async fn test_reports_endpoint() {
        let (status, json) = get_json(build_router(test_state().await), "/api/reports").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["alerts"][0]["kind"], "shortfall");
    }

    #[tokio::test]
    async fn test_single_report_endpoint() {
        let (status, json) =
            get_json(build_router(test_state().await), "/api/reports/30min").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["resolution"], "30min");

        let (status, _) = get_json(build_router(test_state().await), "/api/reports/1day").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_publish_replaces_same_resolution() {
        let state = test_state().await;
        state.publish(report("30min")).await;
        state.publish(report("2hour")).await;
        assert_eq!(state.reports.read().await.len(), 2);
        assert_eq!(*state.cycles_run.read().await, 3);
    }
}
