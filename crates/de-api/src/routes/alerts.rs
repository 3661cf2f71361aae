//! Threat monitor endpoints.

use axum::{extract::State, routing::get, Json, Router};
use de_alerts::{AlertMonitor, ThreatCheckReport};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Creates alert routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/check", get(last_check).post(run_check))
}

fn monitor(state: &AppState) -> Result<&Arc<AlertMonitor>, ApiError> {
    state
        .monitor
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Threat monitor is not running".to_string()))
}

/// Run one threat check now.
#[utoipa::path(
    post,
    path = "/api/alerts/check",
    responses(
        (status = 200, description = "Check report"),
        (status = 502, description = "NASA feed unavailable"),
        (status = 503, description = "Threat monitor is not running")
    ),
    tag = "Alerts"
)]
pub async fn run_check(
    State(state): State<AppState>,
) -> Result<Json<ThreatCheckReport>, ApiError> {
    let report = monitor(&state)?.run_check().await?;
    info!(
        threats = report.threats.len(),
        alerts_sent = report.alerts_sent(),
        "Manual threat check complete"
    );
    Ok(Json(report))
}

/// Report from the most recent threat check.
#[utoipa::path(
    get,
    path = "/api/alerts/check",
    responses(
        (status = 200, description = "Last check report"),
        (status = 404, description = "No check has run yet"),
        (status = 503, description = "Threat monitor is not running")
    ),
    tag = "Alerts"
)]
pub async fn last_check(
    State(state): State<AppState>,
) -> Result<Json<ThreatCheckReport>, ApiError> {
    monitor(&state)?
        .last_report()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No threat check has run yet".to_string()))
}
