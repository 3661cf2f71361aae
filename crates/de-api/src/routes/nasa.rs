//! NASA NeoWs proxy endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use de_connectors::data::nasa::{check_feed_range, MAX_BROWSE_SIZE};
use de_connectors::{NeoBrowsePage, NeoFeed};
use serde::Serialize;
use tracing::debug;

use crate::dto::NasaQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// Feed or browse result.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NasaResponse {
    Feed(NeoFeed),
    Browse(NeoBrowsePage),
}

/// Creates NASA routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/nasa", get(get_neos))
}

/// List near-Earth objects.
///
/// Feed mode covers `start_date..=end_date` (at most seven days). A missing
/// start defaults to today, or to `end_date` when only that is given; a
/// missing end defaults to the start. `mode=browse` pages the catalogue
/// instead, with `size` capped at 20.
#[utoipa::path(
    get,
    path = "/api/nasa",
    params(NasaQuery),
    responses(
        (status = 200, description = "Feed or browse page of normalized NEOs"),
        (status = 400, description = "Invalid date range"),
        (status = 429, description = "NASA rate limit exceeded"),
        (status = 502, description = "NASA API error")
    ),
    tag = "Lookup"
)]
pub async fn get_neos(
    State(state): State<AppState>,
    Query(query): Query<NasaQuery>,
) -> Result<Json<NasaResponse>, ApiError> {
    if query.is_browse() {
        let page = query.page.unwrap_or(0);
        let size = query.size.unwrap_or(MAX_BROWSE_SIZE).clamp(1, MAX_BROWSE_SIZE);
        debug!(page, size, "Browsing NEO catalogue");
        let result = state.neo.browse(page, size).await?;
        return Ok(Json(NasaResponse::Browse(result)));
    }

    let (start, end) = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, start),
        (None, Some(end)) => (end, end),
        (None, None) => {
            let today = Utc::now().date_naive();
            (today, today)
        }
    };
    check_feed_range(start, end)?;

    debug!(%start, %end, "Fetching NEO feed");
    let feed = state.neo.feed(start, end).await?;
    Ok(Json(NasaResponse::Feed(feed)))
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
    async fn test_feed_defaults_to_today() {
        let ctx = test_context();

        let response = ctx.router().oneshot(get_request("/api/nasa")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let today = Utc::now().date_naive().to_string();
        assert_eq!(body["start_date"], today);
        assert_eq!(body["end_date"], today);
        assert_eq!(body["element_count"], 1);
        assert_eq!(body["objects"][0]["name"], "Apophis");
        assert_eq!(ctx.neo.feed_calls(), 1);
    }

    #[tokio::test]
    async fn test_feed_rejects_long_range() {
        let ctx = test_context();

        let response = ctx
            .router()
            .oneshot(get_request(
                "/api/nasa?start_date=2024-06-01&end_date=2024-06-20",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ctx.neo.feed_calls(), 0);
    }

    #[tokio::test]
    async fn test_feed_upstream_error() {
        let ctx = test_context();
        ctx.neo.set_should_fail(true).await;

        let response = ctx
            .router()
            .oneshot(get_request("/api/nasa?start_date=2024-06-01"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_browse_caps_size() {
        let ctx = test_context();

        let response = ctx
            .router()
            .oneshot(get_request("/api/nasa?mode=browse&page=0&size=500"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["size"], 20);
        assert_eq!(body["total_elements"], 1);
    }
}
