//! Gmail SMTP test endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use de_alerts::templates;
use de_connectors::Connector;
use de_core::{Channel, ValidatedEmail};
use tracing::{info, warn};
use validator::Validate;

use crate::dto::{DeliveryResult, GmailStatusResponse, TestEmailRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// Creates Gmail test routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/test-gmail", get(gmail_status).post(send_test_email))
}

/// Send a test email through Gmail SMTP, whichever email provider is selected.
#[utoipa::path(
    post,
    path = "/api/test-gmail",
    request_body = TestEmailRequest,
    responses(
        (status = 200, description = "Email sent or simulated", body = DeliveryResult),
        (status = 422, description = "Invalid email address"),
        (status = 502, description = "SMTP delivery failed", body = DeliveryResult)
    ),
    tag = "Testing"
)]
pub async fn send_test_email(
    State(state): State<AppState>,
    Json(request): Json<TestEmailRequest>,
) -> Result<(StatusCode, Json<DeliveryResult>), ApiError> {
    request.validate()?;

    let email = ValidatedEmail::new(&request.email)
        .map_err(|e| ApiError::validation_field("email", "invalid_email", &e.to_string()))?;

    let message = templates::test_message(
        Channel::Email,
        email.as_str(),
        request.subject.as_deref(),
        request.message.as_deref(),
    );
    let result = state.gmail.send(&message).await;
    let delivery = DeliveryResult::from_result(state.gmail.name(), &result);

    if let Err(e) = &result {
        warn!(recipient = %email.masked(), error = %e, "Test email failed");
        return Ok((StatusCode::BAD_GATEWAY, Json(delivery)));
    }

    info!(recipient = %email.masked(), demo = delivery.demo, "Test email sent");
    Ok((StatusCode::OK, Json(delivery)))
}

/// Gmail configuration status.
#[utoipa::path(
    get,
    path = "/api/test-gmail",
    responses(
        (status = 200, description = "Gmail status", body = GmailStatusResponse)
    ),
    tag = "Testing"
)]
pub async fn gmail_status(State(state): State<AppState>) -> Json<GmailStatusResponse> {
    let status = state.providers.iter().find(|p| p.name == "gmail");

    Json(GmailStatusResponse {
        provider: state.gmail.name().to_string(),
        configured: status.is_some_and(|s| s.configured),
        demo: state.gmail.is_demo(),
        user: status.and_then(|s| s.identity.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use de_connectors::{MockTransport, ProviderStatus};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::test_helpers::{json_body, test_context};

    fn post_email(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/test-gmail")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_send_uses_gmail_transport() {
        let ctx = test_context();
        let gmail = MockTransport::new("gmail", Channel::Email);
        let state = ctx.state.clone().with_gmail(Arc::new(gmail.clone()));

        let response = crate::routes::create_router(state)
            .oneshot(post_email(json!({
                "email": "pilot@example.com",
                "subject": "Hello",
                "message": "Checking SMTP"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["provider"], "gmail");

        let messages = gmail.get_messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message.subject.as_deref(), Some("Hello"));
        assert_eq!(ctx.email.message_count().await, 0);
    }

    #[tokio::test]
    async fn test_send_failure_is_bad_gateway() {
        let ctx = test_context();
        ctx.email.set_should_fail(true).await;

        let response = ctx
            .router()
            .oneshot(post_email(json!({ "email": "pilot@example.com" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_status_reports_configuration() {
        let ctx = test_context();
        let state = ctx.state.clone().with_providers(vec![ProviderStatus {
            name: "gmail".to_string(),
            channel: Channel::Email,
            configured: true,
            selected: true,
            identity: Some("d***@gmail.com".to_string()),
        }]);

        let response = crate::routes::create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/test-gmail")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["configured"], true);
        assert_eq!(body["user"], "d***@gmail.com");
        assert_eq!(body["demo"], false);
    }
}
