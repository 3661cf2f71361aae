//! # de-connectors
//!
//! Outbound integrations for DefendEarth.
//!
//! This crate provides the connector traits, a shared HTTP client, the email
//! and SMS notification transports, and the clients for the NASA NeoWs,
//! Nominatim and USGS elevation APIs. Every transport falls back to demo mode
//! when its credentials are missing.

pub mod data;
pub mod http;
pub mod notify;
pub mod secure_string;
pub mod traits;

pub use secure_string::SecureString;

pub use traits::{
    AuthConfig, Connector, ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult,
    DeliveryReceipt, ElevationConnector, GeocodingConnector, NeoBrowsePage, NeoFeed,
    NeoFeedConnector, NotificationTransport, OutboundMessage, Place,
};

pub use data::{
    MockElevationConnector, MockGeocodingConnector, MockNeoConnector, NasaConfig,
    NasaNeoConnector, NominatimConfig, NominatimConnector, UsgsConfig, UsgsElevationConnector,
};
pub use notify::{
    EmailJsConfig, EmailJsTransport, EmailProvider, Fast2SmsConfig, Fast2SmsTransport,
    GmailConfig, GmailTransport, MockTransport, ProviderStatus, ProvidersConfig, SmsProvider,
    TextLocalConfig, TextLocalTransport, TwilioConfig, TwilioTransport, Web3FormsConfig,
    Web3FormsTransport,
};
