//! Population density lookup endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use de_core::{PlaceKind, PopulationEstimate};
use tracing::warn;
use validator::Validate;

use crate::dto::{CoordinatesQuery, PopulationResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Radius for the headline population figure.
const SUMMARY_RADIUS_KM: f64 = 10.0;

/// Creates population routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/population", get(get_population))
}

/// Estimate population density at a point from its reverse-geocoded place.
///
/// Points with no known place (open water) have zero density. A geocoder
/// failure falls back to the rural density with `fallback: true`.
#[utoipa::path(
    get,
    path = "/api/population",
    params(CoordinatesQuery),
    responses(
        (status = 200, description = "Population estimate", body = PopulationResponse),
        (status = 422, description = "Coordinates out of range")
    ),
    tag = "Lookup"
)]
pub async fn get_population(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<PopulationResponse>, ApiError> {
    query.validate()?;
    let point = query.point();

    let (place, kind, fallback) = match state.geocoder.reverse(&point).await {
        Ok(Some(place)) => {
            let kind = place.kind;
            (Some(place), kind, false)
        }
        Ok(None) => (None, PlaceKind::Water, false),
        Err(e) => {
            warn!(point = %point, error = %e, "Reverse geocoding failed, using defaults");
            (None, PlaceKind::Rural, true)
        }
    };

    let estimate = PopulationEstimate::from_place(kind);

    Ok(Json(PopulationResponse {
        latitude: point.latitude,
        longitude: point.longitude,
        place_name: place.as_ref().map(|p| p.display_name.clone()),
        place_kind: kind,
        osm_type: place.as_ref().and_then(|p| p.osm_type.clone()),
        country: place.as_ref().and_then(|p| p.country.clone()),
        country_code: place.and_then(|p| p.country_code),
        density_per_km2: estimate.density_per_km2,
        population_within_10km: estimate.population_within(SUMMARY_RADIUS_KM).round(),
        fallback,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::test_helpers::{json_body, test_context};

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_population_for_city() {
        let ctx = test_context();

        let response = ctx
            .router()
            .oneshot(get_request("/api/population?lat=18.52&lng=73.85"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["place_kind"], "city");
        assert_eq!(body["density_per_km2"], 5000.0);
        assert_eq!(body["country_code"], "IN");
        assert_eq!(body["fallback"], false);
        assert!(body["population_within_10km"].as_f64().unwrap() > 1_500_000.0);
    }

    #[tokio::test]
    async fn test_population_open_water() {
        let ctx = test_context();
        ctx.geocoder.set_place(None).await;

        let response = ctx
            .router()
            .oneshot(get_request("/api/population?lat=0&lng=-30"))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["place_kind"], "water");
        assert_eq!(body["density_per_km2"], 0.0);
        assert!(body["place_name"].is_null());
    }

    #[tokio::test]
    async fn test_population_fallback_on_upstream_error() {
        let ctx = test_context();
        ctx.geocoder.set_should_fail(true).await;

        let response = ctx
            .router()
            .oneshot(get_request("/api/population?lat=10&lng=10"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["fallback"], true);
        assert_eq!(body["place_kind"], "rural");
    }
}
