//! Population density estimates from reverse-geocoded place kinds.

use serde::{Deserialize, Serialize};

/// Settlement kind reported by reverse geocoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
    City,
    Town,
    Village,
    Hamlet,
    Rural,
    Water,
}

impl PlaceKind {
    /// Maps an OpenStreetMap `addresstype`/`type`/address key to a kind.
    pub fn from_osm(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "city" | "city_district" | "borough" | "suburb" | "quarter" | "neighbourhood" => {
                PlaceKind::City
            }
            "town" | "municipality" => PlaceKind::Town,
            "village" => PlaceKind::Village,
            "hamlet" | "isolated_dwelling" | "locality" => PlaceKind::Hamlet,
            "ocean" | "sea" | "bay" | "water" | "strait" => PlaceKind::Water,
            _ => PlaceKind::Rural,
        }
    }

    /// Estimated population density in people per km².
    pub fn density_per_km2(&self) -> f64 {
        match self {
            PlaceKind::City => 5000.0,
            PlaceKind::Town => 1000.0,
            PlaceKind::Village => 150.0,
            PlaceKind::Hamlet => 30.0,
            PlaceKind::Rural => 10.0,
            PlaceKind::Water => 0.0,
        }
    }
}

/// A population density estimate for a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationEstimate {
    pub place_kind: PlaceKind,
    pub density_per_km2: f64,
    pub place_name: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

impl PopulationEstimate {
    /// Builds an estimate from a place kind alone.
    pub fn from_place(place_kind: PlaceKind) -> Self {
        Self {
            place_kind,
            density_per_km2: place_kind.density_per_km2(),
            place_name: None,
            country: None,
            country_code: None,
        }
    }

    /// Estimated population inside a circle of `radius_km`.
    pub fn population_within(&self, radius_km: f64) -> f64 {
        std::f64::consts::PI * radius_km.max(0.0).powi(2) * self.density_per_km2
    }
}
