//! Connector trait definitions for DefendEarth.
//!
//! Every outbound integration implements [`Connector`]. Notification
//! transports add [`NotificationTransport`]; the upstream data clients add
//! one of [`NeoFeedConnector`], [`GeocodingConnector`] or
//! [`ElevationConnector`].

use crate::secure_string::SecureString;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use de_core::{Channel, GeoPoint, NearEarthObject, PlaceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur in connectors.
#[derive(Error, Debug, Clone)]
pub enum ConnectorError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Health status of a connector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorHealth {
    Healthy,
    /// Usable but not fully functional, e.g. running in demo mode.
    Degraded(String),
    Unhealthy(String),
    Unknown,
}

/// HTTP settings for a connector.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Connector name/identifier.
    pub name: String,
    /// Base URL for the API.
    pub base_url: String,
    pub auth: AuthConfig,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for idempotent reads. Notification sends are never retried.
    pub max_retries: u32,
    /// Headers added to every request.
    pub headers: HashMap<String, String>,
}

impl ConnectorConfig {
    /// A config with no auth, a 30 second timeout and no retries.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth: AuthConfig::None,
            timeout_secs: 30,
            max_retries: 0,
            headers: HashMap::new(),
        }
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Authentication configuration.
///
/// Credential fields use [`SecureString`] so they are zeroized on drop.
#[derive(Debug, Clone)]
pub enum AuthConfig {
    None,
    /// Raw key sent in a named header.
    ApiKey {
        key: SecureString,
        header_name: String,
    },
    BearerToken {
        token: SecureString,
    },
    Basic {
        username: String,
        password: SecureString,
    },
}

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the connector name.
    fn name(&self) -> &str;

    /// Returns the connector type (e.g., "email", "sms", "neo_feed").
    fn connector_type(&self) -> &str;

    /// Checks the health of the connector.
    async fn health_check(&self) -> ConnectorResult<ConnectorHealth>;

    /// Tests the connection to the external system.
    async fn test_connection(&self) -> ConnectorResult<bool>;
}

// ============================================================================
// Notification transports
// ============================================================================

/// A message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Email address or E.164 phone number.
    pub recipient: String,
    /// Subject line; ignored by SMS transports.
    pub subject: Option<String>,
    /// Plain text body.
    pub body: String,
    /// Optional HTML alternative for email.
    pub html_body: Option<String>,
}

impl OutboundMessage {
    pub fn sms(recipient: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            subject: None,
            body: body.into(),
            html_body: None,
        }
    }

    pub fn email(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: Some(subject.into()),
            body: body.into(),
            html_body: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }
}

/// Proof of a (possibly simulated) delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub provider: String,
    pub message_id: String,
    /// True when the send was simulated because credentials are missing.
    pub demo: bool,
    pub sent_at: DateTime<Utc>,
}

impl DeliveryReceipt {
    pub fn delivered(provider: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message_id: message_id.into(),
            demo: false,
            sent_at: Utc::now(),
        }
    }

    /// A simulated delivery with id `demo_<provider>_<uuid>`.
    pub fn demo(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            message_id: format!("demo_{}_{}", provider, uuid::Uuid::new_v4().simple()),
            demo: true,
            sent_at: Utc::now(),
        }
    }
}

/// Email or SMS delivery provider.
#[async_trait]
pub trait NotificationTransport: Connector {
    fn channel(&self) -> Channel;

    /// True when credentials are missing and sends are simulated.
    fn is_demo(&self) -> bool;

    /// Delivers one message. Implementations never retry.
    async fn send(&self, message: &OutboundMessage) -> ConnectorResult<DeliveryReceipt>;
}

// ============================================================================
// Upstream data
// ============================================================================

/// NEOs with close approaches inside a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeoFeed {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub element_count: usize,
    pub objects: Vec<NearEarthObject>,
}

/// One page of the NEO catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeoBrowsePage {
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub objects: Vec<NearEarthObject>,
}

/// Source of near-Earth object data.
#[async_trait]
pub trait NeoFeedConnector: Connector {
    /// Objects approaching between `start` and `end` inclusive.
    async fn feed(&self, start: NaiveDate, end: NaiveDate) -> ConnectorResult<NeoFeed>;

    /// Pages through the full catalogue.
    async fn browse(&self, page: u32, size: u32) -> ConnectorResult<NeoBrowsePage>;
}

/// A reverse-geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub display_name: String,
    pub kind: PlaceKind,
    /// Raw OpenStreetMap place type.
    pub osm_type: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

/// Reverse geocoding.
#[async_trait]
pub trait GeocodingConnector: Connector {
    /// Returns `None` when no place is known at the point (e.g. open ocean).
    async fn reverse(&self, point: &GeoPoint) -> ConnectorResult<Option<Place>>;
}

/// Ground elevation lookup.
#[async_trait]
pub trait ElevationConnector: Connector {
    /// Elevation in meters, or `None` when the service has no data.
    async fn elevation_m(&self, point: &GeoPoint) -> ConnectorResult<Option<f64>>;
}
