//! Terrain lookup endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use de_core::TerrainClass;
use tracing::warn;
use validator::Validate;

use crate::dto::{CoordinatesQuery, GeologyResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Creates geology routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/geology", get(get_geology))
}

/// Classify the terrain at a point from its USGS elevation.
///
/// An elevation service failure yields lowland terrain with `fallback: true`.
#[utoipa::path(
    get,
    path = "/api/geology",
    params(CoordinatesQuery),
    responses(
        (status = 200, description = "Terrain at the point", body = GeologyResponse),
        (status = 422, description = "Coordinates out of range")
    ),
    tag = "Lookup"
)]
pub async fn get_geology(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<GeologyResponse>, ApiError> {
    query.validate()?;
    let point = query.point();

    let (elevation_m, fallback) = match state.elevation.elevation_m(&point).await {
        Ok(elevation) => (elevation, false),
        Err(e) => {
            warn!(point = %point, error = %e, "Elevation lookup failed, using defaults");
            (None, true)
        }
    };

    let terrain = if fallback {
        TerrainClass::Lowland
    } else {
        TerrainClass::from_elevation(elevation_m)
    };

    Ok(Json(GeologyResponse {
        latitude: point.latitude,
        longitude: point.longitude,
        elevation_m,
        terrain,
        rock_type: terrain.rock_type().to_string(),
        target_density_kg_m3: terrain.target_density_kg_m3(),
        is_ocean: terrain.is_ocean(),
        fallback,
    }))
}
