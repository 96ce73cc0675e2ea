//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::report::CycleReport;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Latest report per resolution. In-memory only, replaced every cycle.
pub struct DashboardState {
    pub scanner_name: String,
    pub reports: RwLock<Vec<CycleReport>>,
    pub cycles_run: RwLock<u64>,
    pub started_at: DateTime<Utc>,
}

impl DashboardState {
    pub fn new(scanner_name: impl Into<String>) -> Self {
        Self {
            scanner_name: scanner_name.into(),
            reports: RwLock::new(Vec::new()),
            cycles_run: RwLock::new(0),
            started_at: Utc::now(),
        }
    }

    /// Store a report, replacing the previous one for the same resolution.
    pub async fn publish(&self, report: CycleReport) {
        let mut reports = self.reports.write().await;
        match reports.iter_mut().find(|r| r.resolution == report.resolution) {
            Some(slot) => *slot = report,
            None => reports.push(report),
        }
        *self.cycles_run.write().await += 1;
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub scanner: String,
    pub cycles_run: u64,
    pub resolutions: Vec<String>,
    pub last_update: Option<DateTime<Utc>>,
    pub uptime_secs: i64,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let reports = state.reports.read().await;
    Json(StatusResponse {
        scanner: state.scanner_name.clone(),
        cycles_run: *state.cycles_run.read().await,
        resolutions: reports.iter().map(|r| r.resolution.clone()).collect(),
        last_update: reports.iter().map(|r| r.timestamp).max(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /api/reports
pub async fn get_reports(State(state): State<AppState>) -> Json<Vec<CycleReport>> {
    Json(state.reports.read().await.clone())
}

/// GET /api/reports/{resolution}
pub async fn get_report(
    State(state): State<AppState>,
    Path(resolution): Path<String>,
) -> Result<Json<CycleReport>, StatusCode> {
    state
        .reports
        .read()
        .await
        .iter()
        .find(|r| r.resolution == resolution)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
