//! Registration and provider test endpoint integration tests.

use axum::http::StatusCode;
use de_core::UserRepository;
use serde_json::{json, Value};

use super::common::{create_test_app, get_request, post_json_request, send_request};

/// Tests the register, list and debug dump flow.
#[tokio::test]
async fn test_register_then_list() {
    let app = create_test_app();

    let (status, body): (StatusCode, Value) = send_request(
        app.router(),
        post_json_request(
            "/api/register-sms-alerts",
            &json!({
                "phone": "98765 43210",
                "latitude": 18.52,
                "longitude": 73.85
            })
            .to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["welcome"]["success"], true);
    assert_eq!(app.sms.recipients().await, vec!["+919876543210".to_string()]);

    let (status, body): (StatusCode, Value) = send_request(
        app.router(),
        post_json_request(
            "/api/register-sms-alerts",
            &json!({
                "email": "ops@example.com",
                "latitude": 40.7,
                "longitude": -74.0,
                "location": "New York"
            })
            .to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["contact"], "o***@example.com");

    let welcome = app.email.get_messages().await;
    assert_eq!(welcome.len(), 1);
    assert!(welcome[0].message.html_body.is_some());

    let (status, body): (StatusCode, Value) =
        send_request(app.router(), get_request("/api/register-sms-alerts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (_, body): (StatusCode, Value) =
        send_request(app.router(), get_request("/api/debug-users")).await;
    assert_eq!(body["count"], 2);
    assert_eq!(app.users.count().await.unwrap(), 2);
}

/// Tests that a second registration of the same email conflicts.
#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = create_test_app();
    let body = json!({ "email": "ops@example.com", "latitude": 1.0, "longitude": 2.0 });

    let (status, _): (StatusCode, Value) = send_request(
        app.router(),
        post_json_request("/api/register-sms-alerts", &body.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let upper = json!({ "email": "OPS@example.com", "latitude": 5.0, "longitude": 6.0 });
    let (status, body): (StatusCode, Value) = send_request(
        app.router(),
        post_json_request("/api/register-sms-alerts", &upper.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

/// Tests that malformed JSON is rejected before reaching the handler.
#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = create_test_app();

    let response = tower::ServiceExt::oneshot(
        app.router(),
        post_json_request("/api/register-sms-alerts", "{not json"),
    )
    .await
    .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(app.users.count().await.unwrap(), 0);
}

/// Tests the test SMS and test email endpoints end to end.
#[tokio::test]
async fn test_provider_test_endpoints() {
    let app = create_test_app();

    let (status, body): (StatusCode, Value) = send_request(
        app.router(),
        post_json_request(
            "/api/test-sms",
            &json!({ "phone": "+14155550100" }).to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message_id"].is_string());

    let (status, body): (StatusCode, Value) = send_request(
        app.router(),
        post_json_request(
            "/api/test-gmail",
            &json!({ "email": "ops@example.com" }).to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body): (StatusCode, Value) =
        send_request(app.router(), get_request("/api/test-gmail")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], false);
}

/// Tests that a failing SMS provider yields a 502 with the error.
#[tokio::test]
async fn test_sms_provider_failure() {
    let app = create_test_app();
    app.sms.fail_for("+14155550100").await;

    let (status, body): (StatusCode, Value) = send_request(
        app.router(),
        post_json_request(
            "/api/test-sms",
            &json!({ "phone": "+14155550100" }).to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["provider"], "mock-sms");
}
