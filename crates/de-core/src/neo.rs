//! Near-Earth object records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::physics::{AsteroidParameters, DEFAULT_VELOCITY_KM_S};

/// A near-Earth object with its closest approach, normalized from NASA data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearEarthObject {
    pub id: String,
    pub name: String,
    pub diameter_min_m: f64,
    pub diameter_max_m: f64,
    /// Relative velocity at closest approach in km/s.
    pub velocity_km_s: Option<f64>,
    /// Miss distance at closest approach in km.
    pub miss_distance_km: Option<f64>,
    pub close_approach_date: Option<NaiveDate>,
    pub potentially_hazardous: bool,
}

impl NearEarthObject {
    /// Mean of the estimated diameter bounds in meters.
    pub fn mean_diameter_m(&self) -> f64 {
        (self.diameter_min_m + self.diameter_max_m) / 2.0
    }

    /// Physical parameters for impact estimation; velocity defaults when unknown.
    pub fn to_parameters(&self) -> AsteroidParameters {
        AsteroidParameters::new(
            self.mean_diameter_m(),
            self.velocity_km_s.unwrap_or(DEFAULT_VELOCITY_KM_S),
        )
    }
}

#[cfg(test)]
pub(crate) fn sample_neo(diameter_m: f64, miss_distance_km: f64) -> NearEarthObject {
    NearEarthObject {
        id: "3542519".to_string(),
        name: "(2010 PK9)".to_string(),
        diameter_min_m: diameter_m * 0.9,
        diameter_max_m: diameter_m * 1.1,
        velocity_km_s: Some(18.5),
        miss_distance_km: Some(miss_distance_km),
        close_approach_date: NaiveDate::from_ymd_opt(2026, 10, 19),
        potentially_hazardous: false,
    }
}
