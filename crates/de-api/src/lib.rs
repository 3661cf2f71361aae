//! # de-api
//!
//! REST API server for DefendEarth.
//!
//! This crate exposes impact simulation, upstream data lookups (NASA, USGS,
//! Nominatim), alert registration and provider test endpoints over axum.

pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::ApiError;
pub use server::{ApiServer, ApiServerConfig};
pub use state::AppState;
