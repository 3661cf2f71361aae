//! Impact simulation endpoint.

use axum::{extract::State, routing::post, Json, Router};
use de_core::{AsteroidParameters, GeoPoint, ImpactEffects, PlaceKind, RiskInput, TerrainClass};
use tracing::{info, warn};
use validator::Validate;

use crate::dto::{ImpactRequest, ImpactResponse, ImpactSite};
use crate::error::ApiError;
use crate::state::AppState;

/// Warning time assumed when the request gives none.
const DEFAULT_WARNING_DAYS: f64 = 365.0;

/// Creates impact routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/impact", post(simulate_impact))
}

/// Estimate impact effects and risk for an asteroid.
///
/// With coordinates, the site's elevation and place are looked up and feed
/// the tsunami term and the casualty estimate. Lookup failures leave the
/// corresponding site fields empty.
#[utoipa::path(
    post,
    path = "/api/impact",
    request_body = ImpactRequest,
    responses(
        (status = 200, description = "Impact effects and risk", body = ImpactResponse),
        (status = 422, description = "Invalid parameters")
    ),
    tag = "Simulation"
)]
pub async fn simulate_impact(
    State(state): State<AppState>,
    Json(request): Json<ImpactRequest>,
) -> Result<Json<ImpactResponse>, ApiError> {
    request.validate()?;

    let mut params = AsteroidParameters::new(request.diameter_m, request.velocity_km_s);
    if let Some(density) = request.density_kg_m3 {
        params = params.with_density(density);
    }
    if let Some(angle) = request.impact_angle_deg {
        params = params.with_angle(angle);
    }
    params
        .validate()
        .map_err(|e| ApiError::validation_field("parameters", "invalid", &e))?;

    let site = match (request.latitude, request.longitude) {
        (Some(lat), Some(lon)) => {
            let point = GeoPoint::new(lat, lon)?;
            Some(lookup_site(&state, point).await)
        }
        (None, None) => None,
        _ => {
            return Err(ApiError::validation_field(
                "longitude",
                "required",
                "latitude and longitude must be given together",
            ))
        }
    };

    let terrain = site.as_ref().and_then(|s| s.terrain);
    let effects = ImpactEffects::estimate_on(&params, terrain);
    let risk = state.predictor.predict(&RiskInput {
        effects: effects.clone(),
        diameter_m: params.diameter_m,
        population_density_per_km2: site.as_ref().and_then(|s| s.population_density_per_km2),
        terrain,
        warning_time_days: request.warning_time_days.unwrap_or(DEFAULT_WARNING_DAYS),
    });

    info!(
        diameter_m = params.diameter_m,
        energy_mt = effects.energy_megatons,
        threat_level = %risk.threat_level,
        risk_score = risk.risk_score,
        "Simulated impact"
    );

    Ok(Json(ImpactResponse {
        parameters: params,
        effects,
        risk,
        site,
    }))
}

async fn lookup_site(state: &AppState, point: GeoPoint) -> ImpactSite {
    let (place, elevation) = tokio::join!(
        state.geocoder.reverse(&point),
        state.elevation.elevation_m(&point)
    );

    let (place_name, population_density_per_km2) = match place {
        Ok(Some(place)) => (Some(place.display_name), Some(place.kind.density_per_km2())),
        Ok(None) => (None, Some(PlaceKind::Water.density_per_km2())),
        Err(e) => {
            warn!(point = %point, error = %e, "Reverse geocoding failed for impact site");
            (None, None)
        }
    };

    let (elevation_m, terrain) = match elevation {
        Ok(elevation) => (elevation, Some(TerrainClass::from_elevation(elevation))),
        Err(e) => {
            warn!(point = %point, error = %e, "Elevation lookup failed for impact site");
            (None, None)
        }
    };

    ImpactSite {
        latitude: point.latitude,
        longitude: point.longitude,
        place_name,
        elevation_m,
        terrain,
        population_density_per_km2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_helpers::{json_body, test_context};

    fn post_impact(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/impact")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_impact_without_site() {
        let ctx = test_context();

        let response = ctx
            .router()
            .oneshot(post_impact(json!({
                "diameter_m": 20.0,
                "velocity_km_s": 20.0,
                "density_kg_m3": 3000.0
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let megatons = body["effects"]["energy_megatons"].as_f64().unwrap();
        assert!((megatons - 0.6).abs() < 0.01, "got {}", megatons);
        assert!(body["site"].is_null());
        assert!(body["risk"]["risk_score"].is_number());
    }

    #[tokio::test]
    async fn test_impact_with_site_uses_lookups() {
        let ctx = test_context();

        let response = ctx
            .router()
            .oneshot(post_impact(json!({
                "diameter_m": 370.0,
                "velocity_km_s": 12.6,
                "latitude": 18.52,
                "longitude": 73.85
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["site"]["place_name"], "Pune, Maharashtra, India");
        assert_eq!(body["site"]["elevation_m"], 560.0);
        assert_eq!(body["site"]["population_density_per_km2"], 5000.0);
        assert_eq!(body["effects"]["tsunami_radius_km"], 0.0);
    }

    #[tokio::test]
    async fn test_ocean_impact_adds_tsunami() {
        let ctx = test_context();
        ctx.elevation.set_elevation(None).await;
        ctx.geocoder.set_place(None).await;

        let response = ctx
            .router()
            .oneshot(post_impact(json!({
                "diameter_m": 370.0,
                "velocity_km_s": 12.6,
                "latitude": 0.0,
                "longitude": -30.0
            })))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["site"]["terrain"], "ocean");
        assert!(body["effects"]["tsunami_radius_km"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_lookup_failures_leave_site_empty() {
        let ctx = test_context();
        ctx.elevation.set_should_fail(true).await;
        ctx.geocoder.set_should_fail(true).await;

        let response = ctx
            .router()
            .oneshot(post_impact(json!({
                "diameter_m": 50.0,
                "velocity_km_s": 17.0,
                "latitude": 10.0,
                "longitude": 10.0
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["site"]["terrain"].is_null());
        assert!(body["site"]["population_density_per_km2"].is_null());
    }

    #[tokio::test]
    async fn test_impact_rejects_invalid_parameters() {
        let ctx = test_context();

        let response = ctx
            .router()
            .oneshot(post_impact(json!({ "diameter_m": -5.0, "velocity_km_s": 20.0 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = ctx
            .router()
            .oneshot(post_impact(json!({
                "diameter_m": 50.0,
                "velocity_km_s": 20.0,
                "latitude": 10.0
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
