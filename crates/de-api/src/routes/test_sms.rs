//! Test SMS endpoint.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use de_alerts::templates;
use de_connectors::Connector;
use de_core::{Channel, ValidatedPhone};
use tracing::{info, warn};
use validator::Validate;

use crate::dto::{DeliveryResult, TestSmsRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// Creates test SMS routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/test-sms", post(send_test_sms))
}

/// Send a test SMS through the selected SMS provider.
#[utoipa::path(
    post,
    path = "/api/test-sms",
    request_body = TestSmsRequest,
    responses(
        (status = 200, description = "Message sent or simulated", body = DeliveryResult),
        (status = 422, description = "Invalid phone number"),
        (status = 502, description = "Provider rejected the message", body = DeliveryResult)
    ),
    tag = "Testing"
)]
pub async fn send_test_sms(
    State(state): State<AppState>,
    Json(request): Json<TestSmsRequest>,
) -> Result<(StatusCode, Json<DeliveryResult>), ApiError> {
    request.validate()?;

    let country_code = request
        .country_code
        .as_deref()
        .or(state.default_country_code.as_deref());
    let phone = ValidatedPhone::with_default_country(&request.phone, country_code)
        .map_err(|e| ApiError::validation_field("phone", "invalid_phone", &e.to_string()))?;

    let message = templates::test_message(
        Channel::Sms,
        phone.as_str(),
        None,
        request.message.as_deref(),
    );
    let result = state.sms.send(&message).await;
    let delivery = DeliveryResult::from_result(state.sms.name(), &result);

    match &result {
        Ok(receipt) => {
            info!(
                provider = %receipt.provider,
                recipient = %phone.masked(),
                demo = receipt.demo,
                "Test SMS sent"
            );
            Ok((StatusCode::OK, Json(delivery)))
        }
        Err(e) => {
            warn!(recipient = %phone.masked(), error = %e, "Test SMS failed");
            Ok((StatusCode::BAD_GATEWAY, Json(delivery)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_helpers::{json_body, test_context};

    fn post_sms(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/test-sms")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_send_custom_text() {
        let ctx = test_context();

        let response = ctx
            .router()
            .oneshot(post_sms(json!({ "phone": "+14155550123", "message": "Drill at noon" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["provider"], "mock-sms");

        let messages = ctx.sms.get_messages().await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].message.body.contains("Drill at noon"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let ctx = test_context();
        ctx.sms.set_should_fail(true).await;

        let response = ctx
            .router()
            .oneshot(post_sms(json!({ "phone": "+14155550123" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_phone_rejected() {
        let ctx = test_context();

        let response = ctx
            .router()
            .oneshot(post_sms(json!({ "phone": "call me" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ctx.sms.message_count().await, 0);
    }
}
