//! User repository.
//!
//! Registered users are held in process memory only. The [`UserRepository`]
//! trait keeps handlers and the alert monitor independent of that choice.

mod memory;

pub use memory::InMemoryUserRepository;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::user::{Contact, User};

/// Errors returned by user repositories.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("User with contact '{0}' is already registered")]
    Duplicate(String),

    #[error("User {0} not found")]
    NotFound(Uuid),
}

/// Storage for registered users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user, rejecting duplicate contacts.
    async fn create(&self, user: User) -> Result<User, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_contact(&self, contact: &Contact) -> Result<Option<User>, StoreError>;

    /// All users ordered by registration time.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    /// Users whose location lies within `radius_km` of `point`.
    async fn find_within(&self, point: &GeoPoint, radius_km: f64) -> Result<Vec<User>, StoreError>;

    async fn mark_verified(&self, id: Uuid) -> Result<User, StoreError>;
}
