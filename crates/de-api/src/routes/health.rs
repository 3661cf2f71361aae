//! Health check endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use de_connectors::Connector;
use std::time::Instant;

use crate::dto::{HealthResponse, TransportHealth};
use crate::state::AppState;

/// Start time for uptime calculation.
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the start time.
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
}

/// Health check endpoint.
///
/// Reports "degraded" while either transport runs in demo mode.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
        (status = 503, description = "User store unavailable", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);
    let users = state.users.count().await;

    let email = TransportHealth {
        provider: state.email.name().to_string(),
        demo: state.email.is_demo(),
    };
    let sms = TransportHealth {
        provider: state.sms.name().to_string(),
        demo: state.sms.is_demo(),
    };

    let (http_status, status) = match users {
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        Ok(_) if email.demo || sms.demo => (StatusCode::OK, "degraded"),
        Ok(_) => (StatusCode::OK, "healthy"),
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            registered_users: users.unwrap_or(0),
            email,
            sms,
            monitor_running: state.monitor.is_some(),
        }),
    )
}

/// Readiness probe.
///
/// Returns 200 if the user store answers.
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = "Health"
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match state.users.count().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = "Health"
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}
