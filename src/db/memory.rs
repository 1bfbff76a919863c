//! In-process store used when no MongoDB URI is configured, and by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::db::repository::{
    DestinationRepository, DuplicateKey, StoreError, UserRepository,
};
use crate::models::destination::{Destination, DestinationPatch};
use crate::models::user::{ProfileChanges, User, UserRole};
use crate::services::query::{self, DestinationFilter};

#[derive(Default)]
pub struct MemoryDestinationRepository {
    records: RwLock<Vec<Destination>>,
}

impl MemoryDestinationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DestinationRepository for MemoryDestinationRepository {
    async fn find(&self, filter: &DestinationFilter) -> Result<Vec<Destination>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|d| query::in_scope(d, filter))
            .cloned()
            .collect())
    }

    async fn find_by_owner(&self, owner: &ObjectId) -> Result<Vec<Destination>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|d| d.user_id.as_ref() == Some(owner))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Destination>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|d| d.id == *id).cloned())
    }

    async fn insert(&self, destination: &Destination) -> Result<(), StoreError> {
        self.records.write().await.push(destination.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: &DestinationPatch,
        at: DateTime<Utc>,
    ) -> Result<Option<Destination>, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|d| d.id == *id).map(|d| {
            patch.clone().apply_to(d);
            d.updated_at = at;
            d.clone()
        }))
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Destination>, StoreError> {
        let mut records = self.records.write().await;
        Ok(records
            .iter()
            .position(|d| d.id == *id)
            .map(|index| records.remove(index)))
    }

    async fn toggle_featured(
        &self,
        id: &ObjectId,
        at: DateTime<Utc>,
    ) -> Result<Option<Destination>, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|d| d.id == *id).map(|d| {
            d.featured = !d.featured;
            d.updated_at = at;
            d.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Checks `candidate` against every other stored user.
fn check_unique(users: &[User], candidate: &User) -> Result<(), StoreError> {
    let others = || users.iter().filter(|u| u.id != candidate.id);

    if candidate.role == UserRole::Admin && others().any(|u| u.role == UserRole::Admin) {
        return Err(StoreError::Duplicate(DuplicateKey::Admin));
    }
    if others().any(|u| u.email == candidate.email) {
        return Err(StoreError::Duplicate(DuplicateKey::Email));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        check_unique(&users, user)?;
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_admin(&self) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.role == UserRole::Admin)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let Some(index) = users.iter().position(|u| u.id == *id) else {
            return Ok(None);
        };
        let mut updated = users[index].clone();
        changes.apply_to(&mut updated);
        check_unique(&users, &updated)?;
        users[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != *id);
        Ok(users.len() != before)
    }
}
