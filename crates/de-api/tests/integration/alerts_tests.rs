//! Threat monitor endpoint integration tests.

use axum::http::StatusCode;
use de_core::GeoPoint;
use serde_json::{json, Value};

use super::common::{create_test_app, get_request, post_json_request, post_request, send_request};

/// Tests that a manual check alerts only registered users near the impact.
#[tokio::test]
async fn test_manual_check_alerts_users_in_radius() {
    let app = create_test_app().with_monitor(GeoPoint::new(18.5, 73.8).unwrap());

    for (contact, lat, lng) in [
        (json!({ "phone": "+919876543210" }), 18.52, 73.85),
        (json!({ "email": "near@example.com" }), 18.6, 73.9),
        (json!({ "email": "far@example.com" }), -33.9, 151.2),
    ] {
        let mut body = contact;
        body["latitude"] = json!(lat);
        body["longitude"] = json!(lng);
        let (status, _): (StatusCode, Value) = send_request(
            app.router(),
            post_json_request("/api/register-sms-alerts", &body.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let welcome_emails = app.email.message_count().await;
    let welcome_sms = app.sms.message_count().await;

    let (status, report): (StatusCode, Value) =
        send_request(app.router(), post_request("/api/alerts/check")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["objects_checked"], 2);
    assert_eq!(report["threats"].as_array().unwrap().len(), 1);
    assert_eq!(report["email"]["sent"], 1);
    assert_eq!(report["sms"]["sent"], 1);

    assert_eq!(app.email.message_count().await, welcome_emails + 1);
    assert_eq!(app.sms.message_count().await, welcome_sms + 1);
    let last = app.email.get_messages().await.pop().unwrap();
    assert_eq!(last.message.recipient, "near@example.com");
    assert!(last.message.subject.unwrap().contains("Apophis"));

    let (status, last_report): (StatusCode, Value) =
        send_request(app.router(), get_request("/api/alerts/check")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(last_report["checked_at"], report["checked_at"]);

    let (_, debug): (StatusCode, Value) =
        send_request(app.router(), get_request("/api/debug")).await;
    assert_eq!(debug["monitor"]["last_threats"], 1);
}

/// Tests that the check endpoint needs a running monitor.
#[tokio::test]
async fn test_check_without_monitor() {
    let app = create_test_app();

    let (status, body): (StatusCode, Value) =
        send_request(app.router(), post_request("/api/alerts/check")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

/// Tests that a NASA outage surfaces as a gateway error.
#[tokio::test]
async fn test_check_with_feed_outage() {
    let app = create_test_app().with_monitor(GeoPoint::new(0.0, 0.0).unwrap());
    app.neo.set_should_fail(true).await;

    let (status, _): (StatusCode, Value) =
        send_request(app.router(), post_request("/api/alerts/check")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
