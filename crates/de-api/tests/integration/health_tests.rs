//! Health check endpoint integration tests.

use axum::http::StatusCode;
use serde_json::Value;
use std::sync::Arc;

use de_connectors::MockTransport;

use super::common::{create_test_app, get_request, send_request, send_request_raw};

/// Tests that the basic health endpoint returns healthy status.
#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = create_test_app();

    let (status, body): (StatusCode, Value) =
        send_request(app.router(), get_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["registered_users"], 0);
    assert_eq!(body["email"]["provider"], "mock-email");
}

/// Tests that demo transports mark the service degraded but still up.
#[tokio::test]
async fn test_health_degraded_with_demo_transport() {
    let mut app = create_test_app();
    app.state.email = Arc::new(MockTransport::email().as_demo());

    let (status, body): (StatusCode, Value) =
        send_request(app.router(), get_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["email"]["demo"], true);
}

/// Tests that probes need no authentication.
#[tokio::test]
async fn test_probes_return_ok() {
    for endpoint in ["/live", "/ready"] {
        let app = create_test_app();
        let (status, _) = send_request_raw(app.server_router(), get_request(endpoint)).await;
        assert_eq!(status, StatusCode::OK, "{}", endpoint);
    }
}

/// Tests that metrics report unavailable without an installed recorder.
#[tokio::test]
async fn test_metrics_without_recorder() {
    let app = create_test_app();

    let (status, _) = send_request_raw(app.router(), get_request("/metrics")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

/// Tests that the full stack adds request IDs and security headers.
#[tokio::test]
async fn test_server_middleware_headers() {
    use tower::ServiceExt;

    let app = create_test_app();
    let response = app
        .server_router()
        .oneshot(get_request("/health"))
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["cache-control"], "no-store");
}

/// Tests that unknown routes return 404.
#[tokio::test]
async fn test_unknown_route_not_found() {
    let app = create_test_app();

    let (status, _) = send_request_raw(app.server_router(), get_request("/api/unknown")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
