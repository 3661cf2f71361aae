//! Closed-form impact physics.
//!
//! Kinetic energy follows `E = ½·m·v²` for a spherical body of uniform
//! density. Effect radii are power laws in energy (megatons TNT) with fixed
//! coefficients, clamped to plausible ranges. Every radius function is
//! monotonically non-decreasing in energy.

use serde::{Deserialize, Serialize};

use crate::terrain::TerrainClass;

/// Joules released by one megaton of TNT.
pub const JOULES_PER_MEGATON: f64 = 4.184e15;

/// Default bulk density of a stony asteroid (kg/m³).
pub const DEFAULT_DENSITY_KG_M3: f64 = 3000.0;
/// Default entry velocity (km/s).
pub const DEFAULT_VELOCITY_KM_S: f64 = 20.0;
/// Default impact angle from horizontal (degrees).
pub const DEFAULT_IMPACT_ANGLE_DEG: f64 = 45.0;

const CRATER_COEFFICIENT: f64 = 0.5;
const CRATER_EXPONENT: f64 = 0.294;
const CRATER_RANGE_KM: (f64, f64) = (0.01, 500.0);

const SEISMIC_COEFFICIENT: f64 = 15.0;
const SEISMIC_EXPONENT: f64 = 0.25;
const SEISMIC_RANGE_KM: (f64, f64) = (1.0, 5000.0);

const TSUNAMI_COEFFICIENT: f64 = 30.0;
const TSUNAMI_EXPONENT: f64 = 0.30;
const TSUNAMI_RANGE_KM: (f64, f64) = (0.0, 10_000.0);

const THERMAL_COEFFICIENT: f64 = 1.5;
const THERMAL_EXPONENT: f64 = 0.41;
const THERMAL_RANGE_KM: (f64, f64) = (0.1, 3000.0);

/// Physical parameters of an impactor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsteroidParameters {
    /// Diameter in meters.
    pub diameter_m: f64,
    /// Velocity at impact in km/s.
    #[serde(default = "default_velocity")]
    pub velocity_km_s: f64,
    /// Bulk density in kg/m³.
    #[serde(default = "default_density")]
    pub density_kg_m3: f64,
    /// Impact angle from horizontal in degrees.
    #[serde(default = "default_angle")]
    pub impact_angle_deg: f64,
}

fn default_velocity() -> f64 {
    DEFAULT_VELOCITY_KM_S
}

fn default_density() -> f64 {
    DEFAULT_DENSITY_KG_M3
}

fn default_angle() -> f64 {
    DEFAULT_IMPACT_ANGLE_DEG
}

impl AsteroidParameters {
    /// Creates parameters with default density and impact angle.
    pub fn new(diameter_m: f64, velocity_km_s: f64) -> Self {
        Self {
            diameter_m,
            velocity_km_s,
            density_kg_m3: DEFAULT_DENSITY_KG_M3,
            impact_angle_deg: DEFAULT_IMPACT_ANGLE_DEG,
        }
    }

    pub fn with_density(mut self, density_kg_m3: f64) -> Self {
        self.density_kg_m3 = density_kg_m3;
        self
    }

    pub fn with_angle(mut self, impact_angle_deg: f64) -> Self {
        self.impact_angle_deg = impact_angle_deg;
        self
    }

    /// Mass in kilograms, `ρ · (4/3)·π·(d/2)³`.
    pub fn mass_kg(&self) -> f64 {
        let radius = self.diameter_m.max(0.0) / 2.0;
        self.density_kg_m3.max(0.0) * (4.0 / 3.0) * std::f64::consts::PI * radius.powi(3)
    }

    /// Kinetic energy in joules.
    pub fn kinetic_energy_joules(&self) -> f64 {
        let v = self.velocity_km_s.max(0.0) * 1000.0;
        0.5 * self.mass_kg() * v * v
    }

    /// Kinetic energy in megatons of TNT.
    pub fn energy_megatons(&self) -> f64 {
        self.kinetic_energy_joules() / JOULES_PER_MEGATON
    }

    /// Validates that all parameters are finite and physically meaningful.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("diameter_m", self.diameter_m),
            ("velocity_km_s", self.velocity_km_s),
            ("density_kg_m3", self.density_kg_m3),
            ("impact_angle_deg", self.impact_angle_deg),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("{} must be a finite number", name));
            }
        }
        if self.diameter_m <= 0.0 {
            return Err("diameter_m must be positive".to_string());
        }
        if self.velocity_km_s <= 0.0 {
            return Err("velocity_km_s must be positive".to_string());
        }
        if self.density_kg_m3 <= 0.0 {
            return Err("density_kg_m3 must be positive".to_string());
        }
        if !(0.0..=90.0).contains(&self.impact_angle_deg) || self.impact_angle_deg == 0.0 {
            return Err("impact_angle_deg must be in (0, 90]".to_string());
        }
        Ok(())
    }
}

fn power_law(energy_mt: f64, coefficient: f64, exponent: f64, range: (f64, f64)) -> f64 {
    if energy_mt <= 0.0 || !energy_mt.is_finite() {
        return range.0;
    }
    (coefficient * energy_mt.powf(exponent)).clamp(range.0, range.1)
}

/// Final crater radius in km for an impact of `energy_mt` megatons.
pub fn crater_radius_km(energy_mt: f64) -> f64 {
    power_law(energy_mt, CRATER_COEFFICIENT, CRATER_EXPONENT, CRATER_RANGE_KM)
}

/// Radius in km of strong ground shaking.
pub fn seismic_radius_km(energy_mt: f64) -> f64 {
    power_law(energy_mt, SEISMIC_COEFFICIENT, SEISMIC_EXPONENT, SEISMIC_RANGE_KM)
}

/// Radius in km reached by a damaging tsunami wave for an ocean impact.
pub fn tsunami_radius_km(energy_mt: f64) -> f64 {
    power_law(energy_mt, TSUNAMI_COEFFICIENT, TSUNAMI_EXPONENT, TSUNAMI_RANGE_KM)
}

/// Radius in km of third-degree burns from the fireball.
pub fn thermal_radius_km(energy_mt: f64) -> f64 {
    power_law(energy_mt, THERMAL_COEFFICIENT, THERMAL_EXPONENT, THERMAL_RANGE_KM)
}

/// Richter-equivalent magnitude of the seismic shock.
pub fn richter_magnitude(energy_joules: f64) -> f64 {
    if energy_joules <= 0.0 {
        return 0.0;
    }
    0.67 * energy_joules.log10() - 5.87
}

/// Derived effects of a single impact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactEffects {
    pub energy_joules: f64,
    pub energy_megatons: f64,
    pub mass_kg: f64,
    pub crater_radius_km: f64,
    pub seismic_radius_km: f64,
    pub thermal_radius_km: f64,
    /// Zero unless the impact site is ocean.
    pub tsunami_radius_km: f64,
    pub richter_magnitude: f64,
    /// Radius within which registered users are alerted.
    pub danger_radius_km: f64,
}

impl ImpactEffects {
    /// Estimates effects for a land impact.
    pub fn estimate(params: &AsteroidParameters) -> Self {
        Self::estimate_on(params, None)
    }

    /// Estimates effects, adding the tsunami radius when `terrain` is ocean.
    pub fn estimate_on(params: &AsteroidParameters, terrain: Option<TerrainClass>) -> Self {
        let energy_joules = params.kinetic_energy_joules();
        let energy_megatons = energy_joules / JOULES_PER_MEGATON;

        // Oblique impacts excavate smaller craters.
        let angle_factor = params
            .impact_angle_deg
            .clamp(1.0, 90.0)
            .to_radians()
            .sin()
            .cbrt();
        let crater =
            (crater_radius_km(energy_megatons) * angle_factor).max(CRATER_RANGE_KM.0);

        let seismic = seismic_radius_km(energy_megatons);
        let thermal = thermal_radius_km(energy_megatons);
        let tsunami = match terrain {
            Some(TerrainClass::Ocean) => tsunami_radius_km(energy_megatons),
            _ => 0.0,
        };

        Self {
            energy_joules,
            energy_megatons,
            mass_kg: params.mass_kg(),
            crater_radius_km: crater,
            seismic_radius_km: seismic,
            thermal_radius_km: thermal,
            tsunami_radius_km: tsunami,
            richter_magnitude: richter_magnitude(energy_joules),
            danger_radius_km: seismic.max(thermal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, rel: f64) -> bool {
        ((a - b) / b).abs() < rel
    }

    #[test]
    fn test_reference_energy() {
        // 20 m stony body at 20 km/s.
        let params = AsteroidParameters::new(20.0, 20.0);
        assert!(approx(params.mass_kg(), 1.2566e7, 1e-3));
        assert!(approx(params.kinetic_energy_joules(), 2.5133e15, 1e-3));
        assert!(approx(params.energy_megatons(), 0.6007, 1e-3));
    }

    #[test]
    fn test_energy_scales_with_cube_of_diameter() {
        let small = AsteroidParameters::new(100.0, 17.0);
        let large = AsteroidParameters::new(200.0, 17.0);
        assert!(approx(
            large.kinetic_energy_joules() / small.kinetic_energy_joules(),
            8.0,
            1e-9
        ));
    }

    #[test]
    fn test_energy_scales_with_square_of_velocity() {
        let slow = AsteroidParameters::new(50.0, 10.0);
        let fast = AsteroidParameters::new(50.0, 30.0);
        assert!(approx(
            fast.kinetic_energy_joules() / slow.kinetic_energy_joules(),
            9.0,
            1e-9
        ));
    }

    #[test]
    fn test_radii_monotonic_in_energy() {
        let energies: Vec<f64> = (-6..=12).map(|e| 10f64.powi(e)).collect();
        for fns in [
            crater_radius_km as fn(f64) -> f64,
            seismic_radius_km,
            tsunami_radius_km,
            thermal_radius_km,
        ] {
            let values: Vec<f64> = energies.iter().map(|e| fns(*e)).collect();
            for pair in values.windows(2) {
                assert!(pair[1] >= pair[0], "{:?}", values);
            }
        }
    }

    #[test]
    fn test_radii_clamped() {
        assert_eq!(crater_radius_km(0.0), 0.01);
        assert_eq!(crater_radius_km(-5.0), 0.01);
        assert_eq!(crater_radius_km(1e30), 500.0);
        assert_eq!(seismic_radius_km(1e30), 5000.0);
        assert_eq!(tsunami_radius_km(0.0), 0.0);
    }

    #[test]
    fn test_tsunami_only_for_ocean() {
        let params = AsteroidParameters::new(300.0, 20.0);
        let land = ImpactEffects::estimate_on(&params, Some(TerrainClass::Lowland));
        let ocean = ImpactEffects::estimate_on(&params, Some(TerrainClass::Ocean));
        assert_eq!(land.tsunami_radius_km, 0.0);
        assert!(ocean.tsunami_radius_km > 0.0);
    }

    #[test]
    fn test_danger_radius_ignores_tsunami() {
        let params = AsteroidParameters::new(300.0, 20.0);
        let land = ImpactEffects::estimate_on(&params, Some(TerrainClass::Lowland));
        let ocean = ImpactEffects::estimate_on(&params, Some(TerrainClass::Ocean));

        assert!(ocean.tsunami_radius_km > ocean.danger_radius_km);
        assert_eq!(ocean.danger_radius_km, land.danger_radius_km);
        assert_eq!(
            ocean.danger_radius_km,
            ocean.seismic_radius_km.max(ocean.thermal_radius_km)
        );
    }

    #[test]
    fn test_oblique_impact_smaller_crater() {
        let vertical = AsteroidParameters::new(500.0, 20.0).with_angle(90.0);
        let grazing = AsteroidParameters::new(500.0, 20.0).with_angle(15.0);
        let v = ImpactEffects::estimate(&vertical);
        let g = ImpactEffects::estimate(&grazing);
        assert!(g.crater_radius_km < v.crater_radius_km);
        assert_eq!(g.energy_megatons, v.energy_megatons);
    }

    #[test]
    fn test_richter_magnitude() {
        // 1e18 J is about magnitude 6.2.
        assert!((richter_magnitude(1e18) - 6.19).abs() < 0.01);
        assert_eq!(richter_magnitude(0.0), 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(AsteroidParameters::new(50.0, 20.0).validate().is_ok());
        assert!(AsteroidParameters::new(0.0, 20.0).validate().is_err());
        assert!(AsteroidParameters::new(50.0, -1.0).validate().is_err());
        assert!(AsteroidParameters::new(50.0, 20.0)
            .with_angle(95.0)
            .validate()
            .is_err());
        assert!(AsteroidParameters::new(f64::NAN, 20.0).validate().is_err());
    }
}
