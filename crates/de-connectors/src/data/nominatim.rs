//! OpenStreetMap Nominatim reverse geocoding.
//!
//! The public instance allows one request per second and requires an
//! identifying User-Agent. Results are cached per rounded coordinate.

use crate::http::{coordinate_key, HttpClient, RateLimitConfig, ResponseCache};
use crate::traits::{
    Connector, ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult,
    GeocodingConnector, Place,
};
use async_trait::async_trait;
use de_core::{GeoPoint, PlaceKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

fn default_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    concat!("DefendEarth/", env!("CARGO_PKG_VERSION"), " (asteroid impact alerts)").to_string()
}

fn default_requests_per_second() -> u32 {
    1
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

/// Nominatim configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            requests_per_second: default_requests_per_second(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, rename = "type")]
    place_type: Option<String>,
    #[serde(default)]
    addresstype: Option<String>,
    #[serde(default)]
    address: HashMap<String, String>,
}

/// Address keys from most to least populous.
const SETTLEMENT_KEYS: [&str; 4] = ["city", "town", "village", "hamlet"];

impl ReverseResponse {
    fn into_place(self) -> Option<Place> {
        if self.error.is_some() {
            return None;
        }
        let display_name = self.display_name?;

        let tag = self.addresstype.as_deref().or(self.place_type.as_deref());
        let mut kind = tag.map(PlaceKind::from_osm).unwrap_or(PlaceKind::Rural);
        if kind == PlaceKind::Rural {
            if let Some(key) = SETTLEMENT_KEYS
                .iter()
                .find(|k| self.address.contains_key(**k))
            {
                kind = PlaceKind::from_osm(key);
            }
        }

        Some(Place {
            display_name,
            kind,
            osm_type: tag.map(str::to_string),
            country: self.address.get("country").cloned(),
            country_code: self
                .address
                .get("country_code")
                .map(|c| c.to_ascii_uppercase()),
        })
    }
}

/// Reverse geocoder backed by Nominatim.
pub struct NominatimConnector {
    client: HttpClient,
    cache: ResponseCache<Option<Place>>,
}

impl NominatimConnector {
    pub fn new(config: NominatimConfig) -> ConnectorResult<Self> {
        let connector_config = ConnectorConfig::new("nominatim", &config.base_url)
            .with_header("User-Agent", &config.user_agent)
            .with_retries(1);
        let client = HttpClient::with_rate_limit(
            connector_config,
            Some(RateLimitConfig::per_second(config.requests_per_second)),
        )?;

        Ok(Self {
            client,
            cache: ResponseCache::new(Duration::from_secs(config.cache_ttl_secs), 10_000),
        })
    }
}

#[async_trait]
impl Connector for NominatimConnector {
    fn name(&self) -> &str {
        "nominatim"
    }

    fn connector_type(&self) -> &str {
        "geocoding"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        match self
            .client
            .get("/status", &[("format", "json")])
            .await
        {
            Ok(_) => Ok(ConnectorHealth::Healthy),
            Err(e) => Ok(ConnectorHealth::Unhealthy(e.to_string())),
        }
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(matches!(self.health_check().await?, ConnectorHealth::Healthy))
    }
}

#[async_trait]
impl GeocodingConnector for NominatimConnector {
    #[instrument(skip(self, point), fields(point = %point))]
    async fn reverse(&self, point: &GeoPoint) -> ConnectorResult<Option<Place>> {
        let key = coordinate_key(point.latitude, point.longitude);
        self.cache
            .get_or_try_insert_with(key, || async {
                let lat = point.latitude.to_string();
                let lon = point.longitude.to_string();
                let query = [
                    ("format", "jsonv2"),
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("zoom", "10"),
                    ("addressdetails", "1"),
                ];
                let response: ReverseResponse = self.client.get_json("/reverse", &query).await?;
                let place = response.into_place();
                debug!(found = place.is_some(), "Reverse geocoded");
                Ok::<_, ConnectorError>(place)
            })
            .await
    }
}
