//! CLI command implementations.

pub mod check;
pub mod impact;
pub mod serve;

pub use check::{run_check, CheckOptions};
pub use impact::{run_impact, ImpactOptions};
pub use serve::{run_server, ServeConfig};

use anyhow::{Context, Result};
use de_alerts::MonitorConfig;
use de_connectors::{
    ElevationConnector, GeocodingConnector, NasaNeoConnector, NeoFeedConnector,
    NominatimConnector, NotificationTransport, UsgsElevationConnector,
};
use de_core::ThreatAssessor;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, MonitorSettings};

/// Connectors and transports built from configuration.
pub struct Services {
    pub neo: Arc<dyn NeoFeedConnector>,
    pub geocoder: Arc<dyn GeocodingConnector>,
    pub elevation: Arc<dyn ElevationConnector>,
    pub email: Arc<dyn NotificationTransport>,
    pub sms: Arc<dyn NotificationTransport>,
    pub gmail: Arc<dyn NotificationTransport>,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers = &config.providers;
        Ok(Self {
            neo: Arc::new(
                NasaNeoConnector::new(config.nasa.clone())
                    .context("Failed to create NASA client")?,
            ),
            geocoder: Arc::new(
                NominatimConnector::new(config.nominatim.clone())
                    .context("Failed to create Nominatim client")?,
            ),
            elevation: Arc::new(
                UsgsElevationConnector::new(config.usgs.clone())
                    .context("Failed to create USGS client")?,
            ),
            email: providers
                .email_transport()
                .with_context(|| format!("Failed to create {} transport", providers.email_provider))?,
            sms: providers
                .sms_transport()
                .with_context(|| format!("Failed to create {} transport", providers.sms_provider))?,
            gmail: providers
                .gmail_transport()
                .context("Failed to create Gmail transport")?,
        })
    }
}

/// Monitor settings from configuration.
pub fn monitor_config(settings: &MonitorSettings) -> MonitorConfig {
    let assessor = ThreatAssessor {
        miss_distance_threshold_km: settings.miss_distance_threshold_km,
        diameter_threshold_m: settings.diameter_threshold_m,
        ..ThreatAssessor::default()
    }
    .with_random_chance(settings.random_chance);

    MonitorConfig {
        interval: Duration::from_secs(settings.interval_secs),
        lookahead_days: settings.lookahead_days,
        assessor,
    }
}
