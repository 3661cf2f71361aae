//! Fixed-coefficient risk prediction for impact scenarios.
//!
//! The predictor combines impact effects with population and terrain features
//! through linear and logistic formulas. Coefficients are constants; nothing is
//! learned or persisted.

use serde::{Deserialize, Serialize};

use crate::physics::ImpactEffects;
use crate::terrain::TerrainClass;
use crate::threat::ThreatLevel;

/// Coefficients used by [`RiskPredictor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskCoefficients {
    /// Fraction of people killed inside the crater (default: 1.0).
    pub crater_lethality: f64,
    /// Fraction killed in the thermal ring outside the crater (default: 0.3).
    pub thermal_lethality: f64,
    /// Fraction killed in the seismic ring outside the thermal ring (default: 0.01).
    pub seismic_lethality: f64,
    /// Fraction of the tsunami circle that is inhabited coastline (default: 0.05).
    pub tsunami_coast_fraction: f64,
    /// Coastal population density for tsunami losses (default: 200/km²).
    pub coastal_density_per_km2: f64,
    /// Fraction killed in inundated coastline (default: 0.01).
    pub tsunami_lethality: f64,
    /// Economic loss per casualty in USD (default: 1.2e6).
    pub loss_per_casualty_usd: f64,
    /// Economic loss per affected km² in USD (default: 2.5e6).
    pub loss_per_km2_usd: f64,
    /// Density used when no population estimate is available (default: 50/km²).
    pub fallback_density_per_km2: f64,
    /// Logistic intercept for deflection success (default: 2.5).
    pub deflection_intercept: f64,
    /// Weight on ln(warning years) (default: 0.8).
    pub deflection_warning_weight: f64,
    /// Weight on log10(diameter m) (default: -1.1).
    pub deflection_size_weight: f64,
}

impl Default for RiskCoefficients {
    fn default() -> Self {
        Self {
            crater_lethality: 1.0,
            thermal_lethality: 0.3,
            seismic_lethality: 0.01,
            tsunami_coast_fraction: 0.05,
            coastal_density_per_km2: 200.0,
            tsunami_lethality: 0.01,
            loss_per_casualty_usd: 1.2e6,
            loss_per_km2_usd: 2.5e6,
            fallback_density_per_km2: 50.0,
            deflection_intercept: 2.5,
            deflection_warning_weight: 0.8,
            deflection_size_weight: -1.1,
        }
    }
}

impl RiskCoefficients {
    /// Validates that lethality fractions lie in [0, 1] and losses are non-negative.
    pub fn validate(&self) -> Result<(), String> {
        let fractions = [
            self.crater_lethality,
            self.thermal_lethality,
            self.seismic_lethality,
            self.tsunami_coast_fraction,
            self.tsunami_lethality,
        ];
        if fractions.iter().any(|f| !(0.0..=1.0).contains(f)) {
            return Err("Lethality fractions must be within [0, 1]".to_string());
        }
        if self.loss_per_casualty_usd < 0.0
            || self.loss_per_km2_usd < 0.0
            || self.coastal_density_per_km2 < 0.0
            || self.fallback_density_per_km2 < 0.0
        {
            return Err("Loss and density coefficients must be non-negative".to_string());
        }
        Ok(())
    }
}

/// Input features for a prediction.
#[derive(Debug, Clone)]
pub struct RiskInput {
    pub effects: ImpactEffects,
    pub diameter_m: f64,
    /// People per km² at the impact site, if known.
    pub population_density_per_km2: Option<f64>,
    /// Terrain class at the impact site, if known.
    pub terrain: Option<TerrainClass>,
    /// Time between detection and impact in days.
    pub warning_time_days: f64,
}

/// Output of the risk predictor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub estimated_casualties: f64,
    pub economic_impact_usd: f64,
    /// Probability in (0, 1) that a kinetic deflection mission succeeds.
    pub deflection_success_probability: f64,
    /// Weighted area of lethal effects in km².
    pub affected_area_km2: f64,
    /// Composite score in [0, 100].
    pub risk_score: f64,
    /// Confidence in [0, 1] based on input completeness.
    pub confidence: f64,
    pub threat_level: ThreatLevel,
}

/// Applies [`RiskCoefficients`] to impact features.
#[derive(Debug, Clone, Default)]
pub struct RiskPredictor {
    coefficients: RiskCoefficients,
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl RiskPredictor {
    pub fn new(coefficients: RiskCoefficients) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &RiskCoefficients {
        &self.coefficients
    }

    /// Lethality-weighted area of the crater, thermal and seismic rings in km².
    pub fn affected_area_km2(&self, effects: &ImpactEffects) -> f64 {
        let c = &self.coefficients;
        let pi = std::f64::consts::PI;

        let r_crater = effects.crater_radius_km;
        let r_thermal = effects.thermal_radius_km.max(r_crater);
        let r_seismic = effects.seismic_radius_km.max(r_thermal);

        let crater = pi * r_crater.powi(2);
        let thermal_ring = pi * (r_thermal.powi(2) - r_crater.powi(2));
        let seismic_ring = pi * (r_seismic.powi(2) - r_thermal.powi(2));

        crater * c.crater_lethality
            + thermal_ring * c.thermal_lethality
            + seismic_ring * c.seismic_lethality
    }

    /// Success probability of deflection given warning time and size.
    pub fn deflection_probability(&self, warning_time_days: f64, diameter_m: f64) -> f64 {
        let c = &self.coefficients;
        let years = warning_time_days.max(0.0) / 365.25;
        let x = c.deflection_intercept
            + c.deflection_warning_weight * (years + 0.01).ln()
            + c.deflection_size_weight * diameter_m.max(1.0).log10();
        logistic(x)
    }

    pub fn predict(&self, input: &RiskInput) -> RiskPrediction {
        let c = &self.coefficients;
        let pi = std::f64::consts::PI;
        let terrain = input.terrain.unwrap_or(TerrainClass::Lowland);
        let density = input
            .population_density_per_km2
            .unwrap_or(c.fallback_density_per_km2)
            .max(0.0);

        let affected_area = self.affected_area_km2(&input.effects);
        let mut casualties = affected_area * density;

        if terrain.is_ocean() {
            let inundated =
                pi * input.effects.tsunami_radius_km.powi(2) * c.tsunami_coast_fraction;
            casualties += inundated * c.coastal_density_per_km2 * c.tsunami_lethality;
        }

        let economic_impact = casualties * c.loss_per_casualty_usd
            + affected_area * c.loss_per_km2_usd * terrain.economic_multiplier();

        let risk_score = (20.0 * (input.effects.energy_megatons.max(0.0) + 1.0).log10()
            + 10.0 * (casualties + 1.0).log10())
        .clamp(0.0, 100.0);

        let mut confidence = 0.55;
        if input.population_density_per_km2.is_some() {
            confidence += 0.15;
        }
        if input.terrain.is_some() {
            confidence += 0.15;
        }

        RiskPrediction {
            estimated_casualties: casualties.round(),
            economic_impact_usd: economic_impact,
            deflection_success_probability: self
                .deflection_probability(input.warning_time_days, input.diameter_m),
            affected_area_km2: affected_area,
            risk_score,
            confidence,
            threat_level: ThreatLevel::from_diameter(input.diameter_m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::AsteroidParameters;

    fn input(diameter_m: f64, density: Option<f64>, terrain: Option<TerrainClass>) -> RiskInput {
        let params = AsteroidParameters::new(diameter_m, 20.0);
        RiskInput {
            effects: ImpactEffects::estimate_on(&params, terrain),
            diameter_m,
            population_density_per_km2: density,
            terrain,
            warning_time_days: 365.0,
        }
    }

    #[test]
    fn test_default_coefficients_valid() {
        assert!(RiskCoefficients::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_lethality_rejected() {
        let coefficients = RiskCoefficients {
            thermal_lethality: 1.5,
            ..RiskCoefficients::default()
        };
        assert!(coefficients.validate().unwrap_err().contains("[0, 1]"));
    }

    #[test]
    fn test_casualties_scale_with_density() {
        let predictor = RiskPredictor::default();
        let sparse = predictor.predict(&input(100.0, Some(10.0), Some(TerrainClass::Lowland)));
        let dense = predictor.predict(&input(100.0, Some(5000.0), Some(TerrainClass::Lowland)));
        assert!(dense.estimated_casualties > sparse.estimated_casualties);
        assert!(dense.economic_impact_usd > sparse.economic_impact_usd);
    }

    #[test]
    fn test_uninhabited_land_has_no_casualties() {
        let predictor = RiskPredictor::default();
        let prediction = predictor.predict(&input(100.0, Some(0.0), Some(TerrainClass::Mountain)));
        assert_eq!(prediction.estimated_casualties, 0.0);
        assert!(prediction.economic_impact_usd > 0.0);
    }

    #[test]
    fn test_ocean_impact_adds_tsunami_losses() {
        let predictor = RiskPredictor::default();
        let prediction = predictor.predict(&input(500.0, Some(0.0), Some(TerrainClass::Ocean)));
        assert!(prediction.estimated_casualties > 0.0);
    }

    #[test]
    fn test_economic_impact_for_fixed_radii() {
        let pi = std::f64::consts::PI;
        let effects = ImpactEffects {
            energy_joules: 4.184e15,
            energy_megatons: 1.0,
            mass_kg: 1.0e7,
            crater_radius_km: 1.0,
            seismic_radius_km: 3.0,
            thermal_radius_km: 2.0,
            tsunami_radius_km: 10.0,
            richter_magnitude: 4.5,
            danger_radius_km: 3.0,
        };
        let prediction = RiskPredictor::default().predict(&RiskInput {
            effects,
            diameter_m: 100.0,
            population_density_per_km2: Some(0.0),
            terrain: Some(TerrainClass::Ocean),
            warning_time_days: 365.0,
        });

        // Rings: pi * (1.0 + 3 * 0.3 + 5 * 0.01). Tsunami: pi * 100 * 0.05 * 200 * 0.01.
        let area = 1.95 * pi;
        let casualties = 10.0 * pi;
        let expected = casualties * 1.2e6 + area * 2.5e6 * 0.2;

        assert!((prediction.affected_area_km2 - area).abs() < 1e-9);
        assert!((prediction.economic_impact_usd - expected).abs() / expected < 1e-9);
        assert_eq!(prediction.estimated_casualties, 31.0);
    }

    #[test]
    fn test_deflection_probability_bounds_and_trends() {
        let predictor = RiskPredictor::default();
        let early_small = predictor.deflection_probability(3650.0, 50.0);
        let late_small = predictor.deflection_probability(10.0, 50.0);
        let early_large = predictor.deflection_probability(3650.0, 5000.0);

        for p in [early_small, late_small, early_large] {
            assert!(p > 0.0 && p < 1.0);
        }
        assert!(early_small > late_small);
        assert!(early_small > early_large);
    }

    #[test]
    fn test_confidence_reflects_known_inputs() {
        let predictor = RiskPredictor::default();
        let bare = predictor.predict(&input(100.0, None, None));
        let full = predictor.predict(&input(100.0, Some(100.0), Some(TerrainClass::Lowland)));
        assert!((bare.confidence - 0.55).abs() < 1e-9);
        assert!((full.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_risk_score_clamped() {
        let predictor = RiskPredictor::default();
        let extinction = predictor.predict(&input(10_000.0, Some(5000.0), Some(TerrainClass::Lowland)));
        assert!(extinction.risk_score <= 100.0);
        assert_eq!(extinction.threat_level, ThreatLevel::Catastrophic);

        let pebble = predictor.predict(&input(1.0, Some(0.0), Some(TerrainClass::Lowland)));
        assert!(pebble.risk_score >= 0.0);
        assert_eq!(pebble.threat_level, ThreatLevel::Low);
    }
}
