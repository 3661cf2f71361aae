//! Mock data connectors for testing and offline demos.

use crate::traits::{
    Connector, ConnectorError, ConnectorHealth, ConnectorResult, ElevationConnector,
    GeocodingConnector, NeoBrowsePage, NeoFeed, NeoFeedConnector, Place,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use de_core::{GeoPoint, NearEarthObject};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

async fn fail_if(flag: &RwLock<bool>) -> ConnectorResult<()> {
    if *flag.read().await {
        return Err(ConnectorError::ConnectionFailed("Mock failure".to_string()));
    }
    Ok(())
}

async fn health(flag: &RwLock<bool>) -> ConnectorResult<ConnectorHealth> {
    if *flag.read().await {
        Ok(ConnectorHealth::Unhealthy("Mock failure mode".to_string()))
    } else {
        Ok(ConnectorHealth::Healthy)
    }
}

/// Mock NEO source serving a fixed object list.
#[derive(Clone, Default)]
pub struct MockNeoConnector {
    objects: Arc<RwLock<Vec<NearEarthObject>>>,
    should_fail: Arc<RwLock<bool>>,
    feed_calls: Arc<AtomicUsize>,
}

impl MockNeoConnector {
    pub fn new(objects: Vec<NearEarthObject>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(objects)),
            ..Default::default()
        }
    }

    /// Builds an object approaching on `date` with the given size and miss distance.
    pub fn object(
        name: &str,
        diameter_m: f64,
        miss_distance_km: f64,
        date: Option<NaiveDate>,
    ) -> NearEarthObject {
        NearEarthObject {
            id: format!("mock-{}", name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            diameter_min_m: diameter_m,
            diameter_max_m: diameter_m,
            velocity_km_s: Some(20.0),
            miss_distance_km: Some(miss_distance_km),
            close_approach_date: date,
            potentially_hazardous: miss_distance_km < 7_480_000.0 && diameter_m >= 140.0,
        }
    }

    pub async fn set_objects(&self, objects: Vec<NearEarthObject>) {
        *self.objects.write().await = objects;
    }

    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    /// Number of feed requests served or failed.
    pub fn feed_calls(&self) -> usize {
        self.feed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockNeoConnector {
    fn name(&self) -> &str {
        "mock-nasa"
    }

    fn connector_type(&self) -> &str {
        "neo_feed"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        health(&self.should_fail).await
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(!*self.should_fail.read().await)
    }
}

#[async_trait]
impl NeoFeedConnector for MockNeoConnector {
    async fn feed(&self, start: NaiveDate, end: NaiveDate) -> ConnectorResult<NeoFeed> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        fail_if(&self.should_fail).await?;

        // Undated objects are served for every range.
        let objects: Vec<NearEarthObject> = self
            .objects
            .read()
            .await
            .iter()
            .filter(|o| {
                o.close_approach_date
                    .map_or(true, |d| d >= start && d <= end)
            })
            .cloned()
            .collect();

        Ok(NeoFeed {
            start_date: start,
            end_date: end,
            element_count: objects.len(),
            objects,
        })
    }

    async fn browse(&self, page: u32, size: u32) -> ConnectorResult<NeoBrowsePage> {
        fail_if(&self.should_fail).await?;

        let objects = self.objects.read().await;
        let size = size.max(1);
        let total = objects.len() as u64;
        let start = (page as usize).saturating_mul(size as usize);

        Ok(NeoBrowsePage {
            page,
            size,
            total_elements: total,
            total_pages: total.div_ceil(size as u64) as u32,
            objects: objects.iter().skip(start).take(size as usize).cloned().collect(),
        })
    }
}

/// Mock geocoder returning the same place for every point.
#[derive(Clone, Default)]
pub struct MockGeocodingConnector {
    place: Arc<RwLock<Option<Place>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockGeocodingConnector {
    pub fn new(place: Option<Place>) -> Self {
        Self {
            place: Arc::new(RwLock::new(place)),
            should_fail: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn set_place(&self, place: Option<Place>) {
        *self.place.write().await = place;
    }

    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }
}

#[async_trait]
impl Connector for MockGeocodingConnector {
    fn name(&self) -> &str {
        "mock-geocoder"
    }

    fn connector_type(&self) -> &str {
        "geocoding"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        health(&self.should_fail).await
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(!*self.should_fail.read().await)
    }
}

#[async_trait]
impl GeocodingConnector for MockGeocodingConnector {
    async fn reverse(&self, _point: &GeoPoint) -> ConnectorResult<Option<Place>> {
        fail_if(&self.should_fail).await?;
        Ok(self.place.read().await.clone())
    }
}

/// Mock elevation service returning a fixed elevation.
#[derive(Clone, Default)]
pub struct MockElevationConnector {
    elevation_m: Arc<RwLock<Option<f64>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockElevationConnector {
    pub fn new(elevation_m: Option<f64>) -> Self {
        Self {
            elevation_m: Arc::new(RwLock::new(elevation_m)),
            should_fail: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn set_elevation(&self, elevation_m: Option<f64>) {
        *self.elevation_m.write().await = elevation_m;
    }

    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }
}

#[async_trait]
impl Connector for MockElevationConnector {
    fn name(&self) -> &str {
        "mock-elevation"
    }

    fn connector_type(&self) -> &str {
        "elevation"
    }

    async fn health_check(&self) -> ConnectorResult<ConnectorHealth> {
        health(&self.should_fail).await
    }

    async fn test_connection(&self) -> ConnectorResult<bool> {
        Ok(!*self.should_fail.read().await)
    }
}

#[async_trait]
impl ElevationConnector for MockElevationConnector {
    async fn elevation_m(&self, _point: &GeoPoint) -> ConnectorResult<Option<f64>> {
        fail_if(&self.should_fail).await?;
        Ok(*self.elevation_m.read().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use de_core::PlaceKind;

    fn date(day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 3, day)
    }

    #[tokio::test]
    async fn test_feed_filters_by_date() {
        let connector = MockNeoConnector::new(vec![
            MockNeoConnector::object("Early", 10.0, 1e6, date(1)),
            MockNeoConnector::object("Inside", 60.0, 5e4, date(5)),
            MockNeoConnector::object("Undated", 30.0, 1e7, None),
        ]);

        let feed = connector
            .feed(date(4).unwrap(), date(6).unwrap())
            .await
            .unwrap();
        let names: Vec<&str> = feed.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Inside", "Undated"]);
        assert_eq!(connector.feed_calls(), 1);
    }

    #[tokio::test]
    async fn test_browse_pages() {
        let objects = (0..5)
            .map(|i| MockNeoConnector::object(&format!("Rock {}", i), 10.0, 1e6, None))
            .collect();
        let connector = MockNeoConnector::new(objects);

        let page = connector.browse(1, 2).await.unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.objects.len(), 2);
        assert_eq!(page.objects[0].name, "Rock 2");
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let neo = MockNeoConnector::default();
        neo.set_should_fail(true).await;
        assert!(neo.feed(date(1).unwrap(), date(2).unwrap()).await.is_err());

        let geo = MockGeocodingConnector::new(Some(Place {
            display_name: "Lagos, Nigeria".to_string(),
            kind: PlaceKind::City,
            osm_type: Some("city".to_string()),
            country: Some("Nigeria".to_string()),
            country_code: Some("NG".to_string()),
        }));
        let point = GeoPoint::new(6.5, 3.4).unwrap();
        assert!(geo.reverse(&point).await.unwrap().is_some());
        geo.set_should_fail(true).await;
        assert!(geo.reverse(&point).await.is_err());

        let elevation = MockElevationConnector::new(Some(42.0));
        assert_eq!(elevation.elevation_m(&point).await.unwrap(), Some(42.0));
    }
}
