//! NASA NeoWs client.
//!
//! Numeric fields arrive as strings (`"12.34"`) and are parsed here into
//! [`NearEarthObject`] values.

use crate::http::HttpClient;
use crate::secure_string::SecureString;
use crate::traits::{
    Connector, ConnectorConfig, ConnectorError, ConnectorHealth, ConnectorResult, NeoBrowsePage,
    NeoFeed, NeoFeedConnector,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use de_core::NearEarthObject;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Public key with low rate limits, used when none is configured.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Longest date span the feed endpoint accepts.
pub const MAX_FEED_DAYS: i64 = 7;

/// Largest page the browse endpoint returns.
pub const MAX_BROWSE_SIZE: u32 = 20;

fn default_base_url() -> String {
    "https://api.nasa.gov".to_string()
}

/// NASA API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NasaConfig {
    #[serde(default)]
    pub api_key: Option<SecureString>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for NasaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

impl NasaConfig {
    pub fn uses_demo_key(&self) -> bool {
        self.api_key.as_ref().map_or(true, |k| k.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    element_count: usize,
    near_earth_objects: HashMap<String, Vec<RawNeo>>,
}

#[derive(Debug, Deserialize)]
struct BrowseResponse {
    page: RawPage,
    near_earth_objects: Vec<RawNeo>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    size: u32,
    total_elements: u64,
    total_pages: u32,
    number: u32,
}

#[derive(Debug, Deserialize)]
struct RawNeo {
    id: String,
    name: String,
    #[serde(default)]
    estimated_diameter: Option<EstimatedDiameter>,
    #[serde(default)]
    is_potentially_hazardous_asteroid: bool,
    #[serde(default)]
    close_approach_data: Vec<CloseApproach>,
}

#[derive(Debug, Deserialize)]
struct EstimatedDiameter {
    meters: DiameterRange,
}

#[derive(Debug, Deserialize)]
struct DiameterRange {
    estimated_diameter_min: f64,
    estimated_diameter_max: f64,
}

#[derive(Debug, Deserialize)]
struct CloseApproach {
    close_approach_date: String,
    relative_velocity: RelativeVelocity,
    miss_distance: MissDistance,
}

#[derive(Debug, Deserialize)]
struct RelativeVelocity {
    kilometers_per_second: String,
}

#[derive(Debug, Deserialize)]
struct MissDistance {
    kilometers: String,
}

impl RawNeo {
    /// Normalizes the record using the first approach on or after `reference`,
    /// falling back to the latest recorded approach.
    fn normalize(self, reference: NaiveDate) -> NearEarthObject {
        let (diameter_min_m, diameter_max_m) = self
            .estimated_diameter
            .map(|d| (d.meters.estimated_diameter_min, d.meters.estimated_diameter_max))
            .unwrap_or((0.0, 0.0));

        let approaches: Vec<(Option<NaiveDate>, &CloseApproach)> = self
            .close_approach_data
            .iter()
            .map(|a| (NaiveDate::parse_from_str(&a.close_approach_date, "%Y-%m-%d").ok(), a))
            .collect();
        let chosen = approaches
            .iter()
            .filter(|(date, _)| date.is_some_and(|d| d >= reference))
            .min_by_key(|(date, _)| *date)
            .or_else(|| approaches.last());

        let (close_approach_date, velocity_km_s, miss_distance_km) = match chosen {
            Some((date, approach)) => (
                *date,
                approach.relative_velocity.kilometers_per_second.parse().ok(),
                approach.miss_distance.kilometers.parse().ok(),
            ),
            None => (None, None, None),
        };

        NearEarthObject {
            id: self.id,
            name: self.name,
            diameter_min_m,
            diameter_max_m,
            velocity_km_s,
            miss_distance_km,
            close_approach_date,
            potentially_hazardous: self.is_potentially_hazardous_asteroid,
        }
    }
}

fn into_feed(response: FeedResponse, start: NaiveDate, end: NaiveDate) -> NeoFeed {
    let mut objects: Vec<NearEarthObject> = response
        .near_earth_objects
        .into_values()
        .flatten()
        .map(|raw| raw.normalize(start))
        .collect();
    objects.sort_by(|a, b| {
        a.close_approach_date
            .cmp(&b.close_approach_date)
            .then_with(|| a.name.cmp(&b.name))
    });

    NeoFeed {
        start_date: start,
        end_date: end,
        element_count: response.element_count,
        objects,
    }
}

/// Validates a feed date range.
pub fn check_feed_range(start: NaiveDate, end: NaiveDate) -> ConnectorResult<()> {
    if end < start {
        return Err(ConnectorError::InvalidRequest(format!(
            "end_date {} is before start_date {}",
            end, start
        )));
    }
    if (end - start).num_days() > MAX_FEED_DAYS {
        return Err(ConnectorError::InvalidRequest(format!(
            "Date range must not exceed {} days",
            MAX_FEED_DAYS
        )));
    }
    Ok(())
}

/// Client for the NASA Near Earth Object Web Service.
pub struct NasaNeoConnector {
    config: NasaConfig,
    client: HttpClient,
}

impl NasaNeoConnector {
    pub fn new(config: NasaConfig) -> ConnectorResult<Self> {
        let client =
            HttpClient::new(ConnectorConfig::new("nasa", &config.base_url).with_retries(2))?;
        Ok(Self { config, client })
    }

    fn api_key(&self) -> &str {
        self.config
            .api_key
            .as_ref()
            .map(|k| k.expose_secret())
            .filter(|k| !k.is_empty())
            .unwrap_or(DEMO_API_KEY)
    }
}

#[async_trait]
impl Connector for NasaNeoConnector {
    fn name(&self) -> &str {
        "nasa"
    }

    fn connector_type(&self) -> &str {
        "neo_feed"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        match self.browse(0, 1).await {
            Ok(_) if self.config.uses_demo_key() => Ok(ConnectorHealth::Degraded(
                "using DEMO_KEY rate limits".to_string(),
            )),
            Ok(_) => Ok(ConnectorHealth::Healthy),
            Err(e) => Ok(ConnectorHealth::Unhealthy(e.to_string())),
        }
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(self.browse(0, 1).await.is_ok())
    }
}

#[async_trait]
impl NeoFeedConnector for NasaNeoConnector {
    #[instrument(skip(self))]
    async fn feed(&self, start: NaiveDate, end: NaiveDate) -> ConnectorResult<NeoFeed> {
        check_feed_range(start, end)?;

        let start_date = start.format("%Y-%m-%d").to_string();
        let end_date = end.format("%Y-%m-%d").to_string();
        let query = [
            ("start_date", start_date.as_str()),
            ("end_date", end_date.as_str()),
            ("api_key", self.api_key()),
        ];

        let response: FeedResponse = self.client.get_json("/neo/rest/v1/feed", &query).await?;
        let feed = into_feed(response, start, end);
        debug!(count = feed.objects.len(), "Fetched NEO feed");
        Ok(feed)
    }

    #[instrument(skip(self))]
    async fn browse(&self, page: u32, size: u32) -> ConnectorResult<NeoBrowsePage> {
        let size = size.clamp(1, MAX_BROWSE_SIZE);
        let page_param = page.to_string();
        let size_param = size.to_string();
        let query = [
            ("page", page_param.as_str()),
            ("size", size_param.as_str()),
            ("api_key", self.api_key()),
        ];

        let response: BrowseResponse = self
            .client
            .get_json("/neo/rest/v1/neo/browse", &query)
            .await?;

        let today = Utc::now().date_naive();
        Ok(NeoBrowsePage {
            page: response.page.number,
            size: response.page.size,
            total_elements: response.page.total_elements,
            total_pages: response.page.total_pages,
            objects: response
                .near_earth_objects
                .into_iter()
                .map(|raw| raw.normalize(today))
                .collect(),
        })
    }
}
