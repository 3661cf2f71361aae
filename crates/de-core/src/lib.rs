//! # de-core
//!
//! Domain models and closed-form estimators for DefendEarth.
//!
//! This crate provides the great-circle distance helper, the impact physics
//! estimator, the fixed-coefficient risk predictor, the threat heuristic used
//! by the alert monitor, input validation, and the in-memory user repository.

pub mod geo;
pub mod neo;
pub mod physics;
pub mod population;
pub mod risk;
pub mod store;
pub mod terrain;
pub mod threat;
pub mod user;
pub mod validation;

pub use geo::{haversine_km, GeoError, GeoPoint, EARTH_RADIUS_KM};
pub use neo::NearEarthObject;
pub use physics::{AsteroidParameters, ImpactEffects, JOULES_PER_MEGATON};
pub use population::{PlaceKind, PopulationEstimate};
pub use risk::{RiskCoefficients, RiskInput, RiskPrediction, RiskPredictor};
pub use store::{InMemoryUserRepository, StoreError, UserRepository};
pub use terrain::TerrainClass;
pub use threat::{AsteroidAlert, ThreatAssessor, ThreatLevel};
pub use user::{Channel, Contact, User};
pub use validation::{
    validate_email, validate_phone, EmailValidationError, PhoneValidationError, ValidatedEmail,
    ValidatedPhone,
};
