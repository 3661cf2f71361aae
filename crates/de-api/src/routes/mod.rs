//! API routes.

pub mod alerts;
pub mod debug;
pub mod geology;
pub mod health;
pub mod impact;
pub mod metrics;
pub mod nasa;
pub mod population;
pub mod register;
pub mod test_gmail;
pub mod test_sms;

use crate::state::AppState;
use axum::Router;

/// Creates the main API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .merge(health::routes())
        .merge(metrics::routes())
        .with_state(state)
}

/// API routes under /api prefix.
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(register::routes())
        .merge(test_sms::routes())
        .merge(test_gmail::routes())
        .merge(geology::routes())
        .merge(population::routes())
        .merge(nasa::routes())
        .merge(debug::routes())
        .merge(impact::routes())
        .nest("/alerts", alerts::routes())
}
