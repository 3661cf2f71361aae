//! In-memory implementation of [`UserRepository`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, UserRepository};
use crate::geo::GeoPoint;
use crate::user::{Contact, User};

/// User repository backed by a `HashMap` behind a `RwLock`.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with users.
    pub fn with_users(users: Vec<User>) -> Self {
        let map: HashMap<Uuid, User> = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Arc::new(RwLock::new(map)),
        }
    }
}

fn sorted(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| {
        a.registered_at
            .cmp(&b.registered_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    users
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.contact == user.contact) {
            return Err(StoreError::Duplicate(user.contact.masked()));
        }

        debug!(user_id = %user.id, channel = %user.channel(), "Registering user");
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_contact(&self, contact: &Contact) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.contact == contact).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(sorted(users.values().cloned().collect()))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.users.read().await.len())
    }

    async fn find_within(&self, point: &GeoPoint, radius_km: f64) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let matching = users
            .values()
            .filter(|u| point.is_within(&u.location, radius_km))
            .cloned()
            .collect();
        Ok(sorted(matching))
    }

    async fn mark_verified(&self, id: Uuid) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.verified = true;
        Ok(user.clone())
    }
}
