//! Threat heuristic and alert generation.
//!
//! The heuristic is demo logic: an object counts as a threat if it passes close
//! and is large, or by a fixed random chance. Threats become [`AsteroidAlert`]s
//! with a randomized impact point and time to impact.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::neo::NearEarthObject;
use crate::physics::ImpactEffects;

/// Coarse threat level derived from diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatLevel {
    Low,
    Moderate,
    High,
    Catastrophic,
}

impl ThreatLevel {
    pub fn from_diameter(diameter_m: f64) -> Self {
        if diameter_m < 25.0 {
            ThreatLevel::Low
        } else if diameter_m < 140.0 {
            ThreatLevel::Moderate
        } else if diameter_m < 1000.0 {
            ThreatLevel::High
        } else {
            ThreatLevel::Catastrophic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "LOW",
            ThreatLevel::Moderate => "MODERATE",
            ThreatLevel::High => "HIGH",
            ThreatLevel::Catastrophic => "CATASTROPHIC",
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An impact alert generated for one threatening object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsteroidAlert {
    pub id: Uuid,
    pub name: String,
    pub diameter_m: f64,
    pub speed_km_s: f64,
    pub impact: GeoPoint,
    pub time_to_impact_hours: f64,
    pub danger_radius_km: f64,
    pub threat_level: ThreatLevel,
    pub energy_megatons: f64,
    pub generated_at: DateTime<Utc>,
}

impl AsteroidAlert {
    /// Builds an alert for `neo` striking `impact` after `time_to_impact_hours`.
    pub fn from_neo(neo: &NearEarthObject, impact: GeoPoint, time_to_impact_hours: f64) -> Self {
        let params = neo.to_parameters();
        let effects = ImpactEffects::estimate(&params);
        Self {
            id: Uuid::new_v4(),
            name: neo.name.clone(),
            diameter_m: params.diameter_m,
            speed_km_s: params.velocity_km_s,
            impact,
            time_to_impact_hours,
            danger_radius_km: effects.danger_radius_km,
            threat_level: ThreatLevel::from_diameter(params.diameter_m),
            energy_megatons: effects.energy_megatons,
            generated_at: Utc::now(),
        }
    }

    /// Returns true if `location` lies inside the danger radius.
    pub fn endangers(&self, location: &GeoPoint) -> bool {
        self.impact.is_within(location, self.danger_radius_km)
    }
}

/// Evaluates near-Earth objects against the threat heuristic.
#[derive(Debug, Clone)]
pub struct ThreatAssessor {
    /// Objects closer than this are candidates (default: 100,000 km).
    pub miss_distance_threshold_km: f64,
    /// Candidates larger than this are threats (default: 50 m).
    pub diameter_threshold_m: f64,
    /// Chance that any object is flagged regardless (default: 0.2).
    pub random_chance: f64,
    /// Latitude band for synthetic impact points (default: ±60°).
    pub impact_latitude_band: f64,
    /// Range of synthetic time to impact in hours (default: 6..72).
    pub time_to_impact_hours: (f64, f64),
    /// Pins every synthetic impact to this point, for drills.
    pub fixed_impact: Option<GeoPoint>,
}

impl Default for ThreatAssessor {
    fn default() -> Self {
        Self {
            miss_distance_threshold_km: 100_000.0,
            diameter_threshold_m: 50.0,
            random_chance: 0.2,
            impact_latitude_band: 60.0,
            time_to_impact_hours: (6.0, 72.0),
            fixed_impact: None,
        }
    }
}

/// Clamps `p` to [0, 1]; NaN and infinities never flag anything.
fn probability(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl ThreatAssessor {
    pub fn with_random_chance(mut self, random_chance: f64) -> Self {
        self.random_chance = probability(random_chance);
        self
    }

    pub fn with_fixed_impact(mut self, impact: GeoPoint) -> Self {
        self.fixed_impact = Some(impact);
        self
    }

    /// Deterministic part of the heuristic.
    pub fn is_close_and_large(&self, neo: &NearEarthObject) -> bool {
        let close = neo
            .miss_distance_km
            .map(|d| d < self.miss_distance_threshold_km)
            .unwrap_or(false);
        close && neo.mean_diameter_m() > self.diameter_threshold_m
    }

    pub fn is_threat<R: Rng + ?Sized>(&self, neo: &NearEarthObject, rng: &mut R) -> bool {
        self.is_close_and_large(neo) || rng.gen_bool(probability(self.random_chance))
    }

    /// Draws a synthetic impact point and time to impact for `neo`.
    pub fn build_alert<R: Rng + ?Sized>(&self, neo: &NearEarthObject, rng: &mut R) -> AsteroidAlert {
        let impact = match self.fixed_impact {
            Some(point) => point,
            None => {
                let band = self.impact_latitude_band.clamp(0.0, 90.0);
                let latitude = if band > 0.0 {
                    rng.gen_range(-band..=band)
                } else {
                    0.0
                };
                GeoPoint {
                    latitude,
                    longitude: rng.gen_range(-180.0..=180.0),
                }
            }
        };
        let (min_h, max_h) = self.time_to_impact_hours;
        let hours = if max_h > min_h {
            rng.gen_range(min_h..=max_h)
        } else {
            min_h
        };
        AsteroidAlert::from_neo(neo, impact, hours)
    }

    /// Returns an alert for every object that passes the heuristic.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        neos: &[NearEarthObject],
        rng: &mut R,
    ) -> Vec<AsteroidAlert> {
        let mut alerts = Vec::new();
        for neo in neos {
            if self.is_threat(neo, rng) {
                alerts.push(self.build_alert(neo, rng));
            }
        }
        alerts
    }
}
