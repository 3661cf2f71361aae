//! Lookup and simulation endpoint integration tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{create_test_app, get_request, post_json_request, send_request};

/// Tests geology and population for the same point.
#[tokio::test]
async fn test_geology_and_population() {
    let app = create_test_app();

    let (status, geology): (StatusCode, Value) =
        send_request(app.router(), get_request("/api/geology?lat=18.52&lng=73.85")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(geology["terrain"], "highland");
    assert_eq!(geology["target_density_kg_m3"], 2700.0);

    let (status, population): (StatusCode, Value) =
        send_request(app.router(), get_request("/api/population?lat=18.52&lng=73.85")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(population["place_name"], "Pune, Maharashtra, India");
    assert_eq!(population["country"], "India");
}

/// Tests that missing query parameters are rejected.
#[tokio::test]
async fn test_lookup_requires_coordinates() {
    let app = create_test_app();

    let response = tower::ServiceExt::oneshot(app.router(), get_request("/api/geology?lat=10"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Tests the NASA feed for an explicit range and the browse mode.
#[tokio::test]
async fn test_nasa_feed_and_browse() {
    let app = create_test_app();

    let (status, feed): (StatusCode, Value) = send_request(
        app.router(),
        get_request("/api/nasa?start_date=2024-06-01&end_date=2024-06-07"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["start_date"], "2024-06-01");
    assert_eq!(feed["element_count"], 2);

    let (status, page): (StatusCode, Value) =
        send_request(app.router(), get_request("/api/nasa?mode=browse&size=1&page=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["objects"][0]["name"], "Pebble");
}

/// Tests that a reversed range is rejected.
#[tokio::test]
async fn test_nasa_reversed_range() {
    let app = create_test_app();

    let (status, body): (StatusCode, Value) = send_request(
        app.router(),
        get_request("/api/nasa?start_date=2024-06-05&end_date=2024-06-01"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

/// Tests an impact simulation with site lookups.
#[tokio::test]
async fn test_impact_simulation() {
    let app = create_test_app();

    let (status, body): (StatusCode, Value) = send_request(
        app.router(),
        post_json_request(
            "/api/impact",
            &json!({
                "diameter_m": 370.0,
                "velocity_km_s": 12.6,
                "latitude": 18.52,
                "longitude": 73.85,
                "warning_time_days": 3650.0
            })
            .to_string(),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parameters"]["diameter_m"], 370.0);
    assert_eq!(body["risk"]["threat_level"], "HIGH");
    assert!(body["risk"]["estimated_casualties"].as_f64().unwrap() > 0.0);
    let p = body["risk"]["deflection_success_probability"].as_f64().unwrap();
    assert!(p > 0.0 && p < 1.0);
}

/// Tests that the debug endpoint lists providers without a monitor.
#[tokio::test]
async fn test_debug_status() {
    let app = create_test_app();

    let (status, body): (StatusCode, Value) =
        send_request(app.router(), get_request("/api/debug")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email_demo"], false);
    assert!(body["providers"].as_array().unwrap().is_empty());
}
