//! Application state shared across handlers.

use de_alerts::AlertMonitor;
use de_connectors::{
    ElevationConnector, GeocodingConnector, NeoFeedConnector, NotificationTransport,
    ProviderStatus,
};
use de_core::{RiskPredictor, UserRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Registered alert recipients.
    pub users: Arc<dyn UserRepository>,
    /// Transport for the selected email provider.
    pub email: Arc<dyn NotificationTransport>,
    /// Transport for the selected SMS provider.
    pub sms: Arc<dyn NotificationTransport>,
    /// Gmail SMTP transport used by the Gmail test endpoint.
    pub gmail: Arc<dyn NotificationTransport>,
    /// NASA NeoWs client.
    pub neo: Arc<dyn NeoFeedConnector>,
    /// Nominatim reverse geocoder.
    pub geocoder: Arc<dyn GeocodingConnector>,
    /// USGS elevation client.
    pub elevation: Arc<dyn ElevationConnector>,
    pub predictor: Arc<RiskPredictor>,
    /// Configuration status of every notification provider.
    pub providers: Arc<Vec<ProviderStatus>>,
    /// Whether NASA requests use the shared DEMO_KEY.
    pub nasa_demo_key: bool,
    /// Country code prefixed to bare ten-digit phone numbers.
    pub default_country_code: Option<String>,
    /// Periodic threat monitor, when running.
    pub monitor: Option<Arc<AlertMonitor>>,
    /// Prometheus metrics handle for rendering metrics.
    pub prometheus_handle: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Creates a new application state. The Gmail test endpoint uses `email`
    /// until [`AppState::with_gmail`] is called.
    pub fn new(
        users: Arc<dyn UserRepository>,
        email: Arc<dyn NotificationTransport>,
        sms: Arc<dyn NotificationTransport>,
        neo: Arc<dyn NeoFeedConnector>,
        geocoder: Arc<dyn GeocodingConnector>,
        elevation: Arc<dyn ElevationConnector>,
    ) -> Self {
        Self {
            users,
            gmail: Arc::clone(&email),
            email,
            sms,
            neo,
            geocoder,
            elevation,
            predictor: Arc::new(RiskPredictor::default()),
            providers: Arc::new(Vec::new()),
            nasa_demo_key: false,
            default_country_code: None,
            monitor: None,
            prometheus_handle: None,
        }
    }

    pub fn with_gmail(mut self, gmail: Arc<dyn NotificationTransport>) -> Self {
        self.gmail = gmail;
        self
    }

    pub fn with_providers(mut self, providers: Vec<ProviderStatus>) -> Self {
        self.providers = Arc::new(providers);
        self
    }

    pub fn with_predictor(mut self, predictor: RiskPredictor) -> Self {
        self.predictor = Arc::new(predictor);
        self
    }

    pub fn with_nasa_demo_key(mut self, uses_demo_key: bool) -> Self {
        self.nasa_demo_key = uses_demo_key;
        self
    }

    pub fn with_default_country_code(mut self, code: Option<String>) -> Self {
        self.default_country_code = code;
        self
    }

    pub fn with_monitor(mut self, monitor: Arc<AlertMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Creates a new application state with Prometheus handle.
    pub fn with_prometheus_handle(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus_handle = Some(Arc::new(handle));
        self
    }

    /// Transport for `channel`.
    pub fn transport_for(&self, channel: de_core::Channel) -> &Arc<dyn NotificationTransport> {
        match channel {
            de_core::Channel::Email => &self.email,
            de_core::Channel::Sms => &self.sms,
        }
    }
}
