//! Common test utilities for integration tests.

use axum::{
    body::Body,
    http::{Method, StatusCode},
    Router,
};
use de_alerts::{AlertDispatcher, AlertMonitor, MonitorConfig};
use de_api::{routes, state::AppState, ApiServer};
use de_connectors::{
    MockElevationConnector, MockGeocodingConnector, MockNeoConnector, MockTransport, Place,
};
use de_core::{GeoPoint, InMemoryUserRepository, PlaceKind, ThreatAssessor};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;

/// Mocks behind a test application.
pub struct TestApp {
    pub state: AppState,
    pub users: InMemoryUserRepository,
    pub email: MockTransport,
    pub sms: MockTransport,
    pub neo: MockNeoConnector,
    pub geocoder: MockGeocodingConnector,
    pub elevation: MockElevationConnector,
}

impl TestApp {
    /// The API router without server middleware.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    /// The full server stack: middleware, Swagger UI and CORS.
    pub fn server_router(&self) -> Router {
        ApiServer::with_state(self.state.clone()).router()
    }

    /// Attaches a threat monitor whose impacts all land on `impact`.
    pub fn with_monitor(mut self, impact: GeoPoint) -> Self {
        let config = MonitorConfig {
            assessor: ThreatAssessor::default()
                .with_random_chance(0.0)
                .with_fixed_impact(impact),
            ..MonitorConfig::default()
        };
        let monitor = AlertMonitor::new(
            Arc::clone(&self.state.neo),
            Arc::clone(&self.state.users),
            AlertDispatcher::new(Arc::clone(&self.state.email)),
            AlertDispatcher::new(Arc::clone(&self.state.sms)),
            config,
        )
        .with_seed(42);
        self.state = self.state.with_monitor(Arc::new(monitor));
        self
    }
}

/// Reverse geocoding result for central Pune.
pub fn pune() -> Place {
    Place {
        display_name: "Pune, Maharashtra, India".to_string(),
        kind: PlaceKind::City,
        osm_type: Some("city".to_string()),
        country: Some("India".to_string()),
        country_code: Some("IN".to_string()),
    }
}

/// Creates a test application with no users, one large close NEO, Pune as
/// the geocoded place and 560 m elevation.
pub fn create_test_app() -> TestApp {
    let users = InMemoryUserRepository::new();
    let email = MockTransport::email();
    let sms = MockTransport::sms();
    let neo = MockNeoConnector::new(vec![
        MockNeoConnector::object("Apophis", 370.0, 38_000.0, None),
        MockNeoConnector::object("Pebble", 4.0, 9_000_000.0, None),
    ]);
    let geocoder = MockGeocodingConnector::new(Some(pune()));
    let elevation = MockElevationConnector::new(Some(560.0));

    let state = AppState::new(
        Arc::new(users.clone()),
        Arc::new(email.clone()),
        Arc::new(sms.clone()),
        Arc::new(neo.clone()),
        Arc::new(geocoder.clone()),
        Arc::new(elevation.clone()),
    )
    .with_default_country_code(Some("91".to_string()));

    TestApp {
        state,
        users,
        email,
        sms,
        neo,
        geocoder,
        elevation,
    }
}

/// Helper to make GET requests.
pub fn get_request(uri: &str) -> axum::extract::Request<Body> {
    axum::extract::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Helper to make POST requests with JSON body.
pub fn post_json_request(uri: &str, body: &str) -> axum::extract::Request<Body> {
    axum::extract::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to make POST requests without a body.
pub fn post_request(uri: &str) -> axum::extract::Request<Body> {
    axum::extract::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Sends request and parses JSON response.
pub async fn send_request<T: DeserializeOwned>(
    app: Router,
    request: axum::extract::Request<Body>,
) -> (StatusCode, T) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let parsed: T = serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!(
            "Failed to parse response: {} - Body: {:?}",
            e,
            String::from_utf8_lossy(&body)
        )
    });
    (status, parsed)
}

/// Sends request and returns raw response body.
pub async fn send_request_raw(
    app: Router,
    request: axum::extract::Request<Body>,
) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).to_string())
}
