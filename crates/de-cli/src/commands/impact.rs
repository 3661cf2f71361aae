//! Impact command - estimates effects and risk for one asteroid.

use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;
use tracing::warn;

use de_core::{
    AsteroidParameters, GeoPoint, ImpactEffects, PlaceKind, RiskInput, RiskPrediction,
    RiskPredictor, TerrainClass,
};

use super::Services;
use crate::config::AppConfig;

/// Impact parameters from the command line.
#[derive(Debug, Clone)]
pub struct ImpactOptions {
    pub diameter_m: f64,
    pub velocity_km_s: f64,
    pub density_kg_m3: Option<f64>,
    pub impact_angle_deg: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub warning_time_days: f64,
}

impl ImpactOptions {
    fn parameters(&self) -> Result<AsteroidParameters> {
        let mut params = AsteroidParameters::new(self.diameter_m, self.velocity_km_s);
        if let Some(density) = self.density_kg_m3 {
            params = params.with_density(density);
        }
        if let Some(angle) = self.impact_angle_deg {
            params = params.with_angle(angle);
        }
        params.validate().map_err(anyhow::Error::msg)?;
        Ok(params)
    }

    fn site(&self) -> Result<Option<GeoPoint>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Ok(Some(GeoPoint::new(lat, lon)?)),
            (None, None) => Ok(None),
            _ => bail!("--lat and --lng must be given together"),
        }
    }
}

#[derive(Debug, Serialize)]
struct SiteReport {
    point: GeoPoint,
    place: Option<String>,
    elevation_m: Option<f64>,
    terrain: Option<TerrainClass>,
    population_density_per_km2: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ImpactReport {
    parameters: AsteroidParameters,
    effects: ImpactEffects,
    risk: RiskPrediction,
    site: Option<SiteReport>,
}

/// Runs the simulation, looking up the site when coordinates are given.
pub async fn run_impact(options: ImpactOptions, app_config: AppConfig, json: bool) -> Result<()> {
    let params = options.parameters()?;

    let site = match options.site()? {
        Some(point) => Some(lookup_site(&app_config, point).await?),
        None => None,
    };

    let report = simulate(&params, site, options.warning_time_days);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn simulate(
    params: &AsteroidParameters,
    site: Option<SiteReport>,
    warning_time_days: f64,
) -> ImpactReport {
    let terrain = site.as_ref().and_then(|s| s.terrain);
    let effects = ImpactEffects::estimate_on(params, terrain);
    let risk = RiskPredictor::default().predict(&RiskInput {
        effects: effects.clone(),
        diameter_m: params.diameter_m,
        population_density_per_km2: site.as_ref().and_then(|s| s.population_density_per_km2),
        terrain,
        warning_time_days,
    });

    ImpactReport {
        parameters: *params,
        effects,
        risk,
        site,
    }
}

async fn lookup_site(app_config: &AppConfig, point: GeoPoint) -> Result<SiteReport> {
    let services = Services::from_config(app_config)?;
    let (place, elevation) = tokio::join!(
        services.geocoder.reverse(&point),
        services.elevation.elevation_m(&point)
    );

    let (place, population_density_per_km2) = match place {
        Ok(Some(place)) => {
            let density = place.kind.density_per_km2();
            (Some(place.display_name), Some(density))
        }
        Ok(None) => (None, Some(PlaceKind::Water.density_per_km2())),
        Err(e) => {
            warn!(error = %e, "Reverse geocoding failed");
            (None, None)
        }
    };

    let (elevation_m, terrain) = match elevation {
        Ok(elevation) => (elevation, Some(TerrainClass::from_elevation(elevation))),
        Err(e) => {
            warn!(error = %e, "Elevation lookup failed");
            (None, None)
        }
    };

    Ok(SiteReport {
        point,
        place,
        elevation_m,
        terrain,
        population_density_per_km2,
    })
}

fn print_report(report: &ImpactReport) {
    let p = &report.parameters;
    let e = &report.effects;
    let r = &report.risk;

    println!("{}", "Impact Simulation".bold());
    println!("─────────────────");
    println!(
        "  {} {:.0} m at {:.1} km/s, {:.0} kg/m³, {:.0}°",
        "Asteroid:".cyan(),
        p.diameter_m,
        p.velocity_km_s,
        p.density_kg_m3,
        p.impact_angle_deg
    );

    if let Some(site) = &report.site {
        println!(
            "  {} {} ({})",
            "Site:".cyan(),
            site.point,
            site.place.as_deref().unwrap_or("unknown place")
        );
        if let Some(terrain) = site.terrain {
            println!("  {} {}", "Terrain:".cyan(), terrain);
        }
    }

    println!();
    println!("{}", "Effects".bold());
    println!("  Energy:          {:.3e} J ({:.2} Mt)", e.energy_joules, e.energy_megatons);
    println!("  Crater radius:   {:.2} km", e.crater_radius_km);
    println!("  Thermal radius:  {:.1} km", e.thermal_radius_km);
    println!("  Seismic radius:  {:.1} km (M{:.1})", e.seismic_radius_km, e.richter_magnitude);
    if e.tsunami_radius_km > 0.0 {
        println!("  Tsunami radius:  {:.1} km", e.tsunami_radius_km);
    }

    println!();
    println!("{}", "Risk".bold());
    println!("  Threat level:    {}", r.threat_level.to_string().red());
    println!("  Risk score:      {:.1} / 100", r.risk_score);
    println!("  Casualties:      {:.0}", r.estimated_casualties);
    println!("  Economic impact: ${:.2e}", r.economic_impact_usd);
    println!(
        "  Deflection:      {:.0}% success",
        r.deflection_success_probability * 100.0
    );
    println!("  Confidence:      {:.0}%", r.confidence * 100.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(diameter_m: f64, velocity_km_s: f64) -> ImpactOptions {
        ImpactOptions {
            diameter_m,
            velocity_km_s,
            density_kg_m3: None,
            impact_angle_deg: None,
            latitude: None,
            longitude: None,
            warning_time_days: 365.0,
        }
    }

    #[test]
    fn test_parameters_apply_overrides() {
        let opts = ImpactOptions {
            density_kg_m3: Some(3000.0),
            impact_angle_deg: Some(30.0),
            ..options(20.0, 20.0)
        };
        let params = opts.parameters().unwrap();
        assert_eq!(params.density_kg_m3, 3000.0);
        assert_eq!(params.impact_angle_deg, 30.0);

        let report = simulate(&params, None, 365.0);
        assert!((report.effects.energy_megatons - 0.6).abs() < 0.01);
        assert!(report.site.is_none());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(options(-1.0, 20.0).parameters().is_err());
        assert!(options(20.0, 0.0).parameters().is_err());
    }

    #[test]
    fn test_site_requires_both_coordinates() {
        let mut opts = options(20.0, 20.0);
        assert!(opts.site().unwrap().is_none());

        opts.latitude = Some(18.5);
        assert!(opts.site().is_err());

        opts.longitude = Some(73.8);
        assert!(opts.site().unwrap().is_some());

        opts.latitude = Some(95.0);
        assert!(opts.site().is_err());
    }

    #[test]
    fn test_ocean_site_adds_tsunami() {
        let params = options(370.0, 12.6).parameters().unwrap();
        let site = SiteReport {
            point: GeoPoint::new(0.0, -30.0).unwrap(),
            place: None,
            elevation_m: None,
            terrain: Some(TerrainClass::Ocean),
            population_density_per_km2: Some(0.0),
        };

        let report = simulate(&params, Some(site), 30.0);
        assert!(report.effects.tsunami_radius_km > 0.0);

        let land = simulate(&params, None, 30.0);
        assert_eq!(land.effects.tsunami_radius_km, 0.0);
    }
}
