//! Diagnostic endpoints for demo deployments.

use axum::{extract::State, routing::get, Json, Router};
use de_connectors::Connector;

use crate::dto::{DebugResponse, DebugUsersResponse, MonitorStatus};
use crate::error::ApiError;
use crate::state::AppState;

/// Creates debug routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/debug", get(debug_status))
        .route("/debug-users", get(debug_users))
}

/// Provider configuration and monitor status.
#[utoipa::path(
    get,
    path = "/api/debug",
    responses(
        (status = 200, description = "Diagnostics", body = DebugResponse)
    ),
    tag = "Debug"
)]
pub async fn debug_status(State(state): State<AppState>) -> Result<Json<DebugResponse>, ApiError> {
    let registered_users = state.users.count().await?;

    let monitor = match &state.monitor {
        Some(monitor) => {
            let last = monitor.last_report().await;
            Some(MonitorStatus {
                interval_secs: monitor.config().interval.as_secs(),
                lookahead_days: monitor.config().lookahead_days,
                last_check: last.as_ref().map(|r| r.checked_at),
                last_threats: last.as_ref().map(|r| r.threats.len()),
            })
        }
        None => None,
    };

    Ok(Json(DebugResponse {
        email_provider: state.email.name().to_string(),
        sms_provider: state.sms.name().to_string(),
        email_demo: state.email.is_demo(),
        sms_demo: state.sms.is_demo(),
        providers: state.providers.as_ref().clone(),
        nasa_demo_key: state.nasa_demo_key,
        registered_users,
        monitor,
    }))
}

/// Every registered user with unmasked contacts.
#[utoipa::path(
    get,
    path = "/api/debug-users",
    responses(
        (status = 200, description = "All registered users", body = DebugUsersResponse)
    ),
    tag = "Debug"
)]
pub async fn debug_users(
    State(state): State<AppState>,
) -> Result<Json<DebugUsersResponse>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(DebugUsersResponse {
        count: users.len(),
        users,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use de_core::{Contact, GeoPoint, User, UserRepository, ValidatedEmail};
    use tower::ServiceExt;

    use crate::test_helpers::{json_body, test_context};

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_debug_reports_providers() {
        let ctx = test_context();
        let state = ctx.state.clone().with_nasa_demo_key(true);

        let response = crate::routes::create_router(state)
            .oneshot(get_request("/api/debug"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["email_provider"], "mock-email");
        assert_eq!(body["sms_provider"], "mock-sms");
        assert_eq!(body["nasa_demo_key"], true);
        assert_eq!(body["registered_users"], 0);
        assert!(body["monitor"].is_null());
    }

    #[tokio::test]
    async fn test_debug_users_is_unmasked() {
        let ctx = test_context();
        ctx.users
            .create(User::new(
                Contact::Email(ValidatedEmail::new("jane@example.com").unwrap()),
                GeoPoint::new(1.0, 2.0).unwrap(),
                None,
            ))
            .await
            .unwrap();

        let response = ctx
            .router()
            .oneshot(get_request("/api/debug-users"))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["users"][0]["contact"]["value"], "jane@example.com");
    }
}
