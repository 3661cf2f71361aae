//! Shared test helpers for the de-api crate.
//!
//! Builds an [`AppState`] wired entirely to in-memory mocks so handler tests
//! never touch the network.

use std::sync::Arc;

use axum::Router;
use de_connectors::{
    MockElevationConnector, MockGeocodingConnector, MockNeoConnector, MockTransport, Place,
};
use de_core::{InMemoryUserRepository, PlaceKind};

use crate::routes;
use crate::state::AppState;

/// Mocks behind a test [`AppState`], kept for assertions.
pub struct TestContext {
    pub state: AppState,
    pub users: InMemoryUserRepository,
    pub email: MockTransport,
    pub sms: MockTransport,
    pub neo: MockNeoConnector,
    pub geocoder: MockGeocodingConnector,
    pub elevation: MockElevationConnector,
}

impl TestContext {
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }
}

pub fn sample_place() -> Place {
    Place {
        display_name: "Pune, Maharashtra, India".to_string(),
        kind: PlaceKind::City,
        osm_type: Some("city".to_string()),
        country: Some("India".to_string()),
        country_code: Some("IN".to_string()),
    }
}

/// Creates a context with empty users, one city place and 560 m elevation.
pub fn test_context() -> TestContext {
    let users = InMemoryUserRepository::new();
    let email = MockTransport::email();
    let sms = MockTransport::sms();
    let neo = MockNeoConnector::new(vec![MockNeoConnector::object(
        "Apophis",
        370.0,
        38_000.0,
        None,
    )]);
    let geocoder = MockGeocodingConnector::new(Some(sample_place()));
    let elevation = MockElevationConnector::new(Some(560.0));

    let state = AppState::new(
        Arc::new(users.clone()),
        Arc::new(email.clone()),
        Arc::new(sms.clone()),
        Arc::new(neo.clone()),
        Arc::new(geocoder.clone()),
        Arc::new(elevation.clone()),
    );

    TestContext {
        state,
        users,
        email,
        sms,
        neo,
        geocoder,
        elevation,
    }
}

/// Reads a JSON response body.
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!(
            "Failed to parse response: {} - Body: {:?}",
            e,
            String::from_utf8_lossy(&body)
        )
    })
}
