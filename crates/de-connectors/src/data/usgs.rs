//! USGS Elevation Point Query Service client.

use crate::http::{coordinate_key, HttpClient, ResponseCache};
use crate::traits::{
    Connector, ConnectorConfig, ConnectorHealth, ConnectorResult, ElevationConnector,
};
use async_trait::async_trait;
use de_core::GeoPoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Values at or below this mean "no data" (outside coverage, open ocean).
pub const NO_DATA_SENTINEL: f64 = -1_000_000.0;

fn default_base_url() -> String {
    "https://epqs.nationalmap.gov".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

/// USGS EPQS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsgsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for UsgsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PointQueryResponse {
    #[serde(default)]
    value: Value,
}

/// Reads the elevation from a number or numeric string, mapping the
/// no-data sentinel to `None`.
pub fn parse_elevation(value: &Value) -> Option<f64> {
    let meters = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (meters.is_finite() && meters > NO_DATA_SENTINEL).then_some(meters)
}

/// Elevation lookup backed by USGS EPQS.
pub struct UsgsElevationConnector {
    client: HttpClient,
    cache: ResponseCache<Option<f64>>,
}

impl UsgsElevationConnector {
    pub fn new(config: UsgsConfig) -> ConnectorResult<Self> {
        let client =
            HttpClient::new(ConnectorConfig::new("usgs", &config.base_url).with_retries(2))?;
        Ok(Self {
            client,
            cache: ResponseCache::new(Duration::from_secs(config.cache_ttl_secs), 10_000),
        })
    }

    async fn query(&self, point: &GeoPoint) -> ConnectorResult<Option<f64>> {
        let x = point.longitude.to_string();
        let y = point.latitude.to_string();
        let query = [
            ("x", x.as_str()),
            ("y", y.as_str()),
            ("units", "Meters"),
            ("wkid", "4326"),
            ("includeDate", "false"),
        ];
        let response: PointQueryResponse = self.client.get_json("/v1/json", &query).await?;
        Ok(parse_elevation(&response.value))
    }
}

#[async_trait]
impl Connector for UsgsElevationConnector {
    fn name(&self) -> &str {
        "usgs"
    }

    fn connector_type(&self) -> &str {
        "elevation"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        // Mount Rainier summit: always inside coverage.
        let probe = GeoPoint {
            latitude: 46.8529,
            longitude: -121.7604,
        };
        match self.query(&probe).await {
            Ok(Some(_)) => Ok(ConnectorHealth::Healthy),
            Ok(None) => Ok(ConnectorHealth::Degraded(
                "probe point returned no data".to_string(),
            )),
            Err(e) => Ok(ConnectorHealth::Unhealthy(e.to_string())),
        }
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(!matches!(
            self.health_check().await?,
            ConnectorHealth::Unhealthy(_)
        ))
    }
}

#[async_trait]
impl ElevationConnector for UsgsElevationConnector {
    #[instrument(skip(self, point), fields(point = %point))]
    async fn elevation_m(&self, point: &GeoPoint) -> ConnectorResult<Option<f64>> {
        let key = coordinate_key(point.latitude, point.longitude);
        let elevation = self
            .cache
            .get_or_try_insert_with(key, || self.query(point))
            .await?;
        debug!(?elevation, "Elevation lookup");
        Ok(elevation)
    }
}
