//! Storage contracts shared by the MongoDB and in-memory backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::destination::{Destination, DestinationPatch};
use crate::models::user::{ProfileChanges, User};
use crate::services::query::DestinationFilter;

/// Which uniqueness rule a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    Email,
    Admin,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0:?}")]
    Duplicate(DuplicateKey),
    #[error("store failure: {0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
pub trait DestinationRepository: Send + Sync {
    /// Records satisfying the owner/status/country part of `filter`. Callers
    /// apply the full predicate and ordering with `services::query::apply`.
    async fn find(&self, filter: &DestinationFilter) -> Result<Vec<Destination>, StoreError>;

    async fn find_by_owner(&self, owner: &ObjectId) -> Result<Vec<Destination>, StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Destination>, StoreError>;

    async fn insert(&self, destination: &Destination) -> Result<(), StoreError>;

    /// Writes only the fields present in `patch`, plus `updatedAt`, in a
    /// single write. Returns the stored record after the update, or `None`
    /// when no record has the id.
    async fn update(
        &self,
        id: &ObjectId,
        patch: &DestinationPatch,
        at: DateTime<Utc>,
    ) -> Result<Option<Destination>, StoreError>;

    async fn delete(&self, id: &ObjectId) -> Result<Option<Destination>, StoreError>;

    /// Flips `featured` in a single write and returns the updated record.
    async fn toggle_featured(
        &self,
        id: &ObjectId,
        at: DateTime<Utc>,
    ) -> Result<Option<Destination>, StoreError>;
}

/// Implementations enforce both uniqueness rules atomically: one account per
/// email, and at most one account with the admin role.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_admin(&self) -> Result<Option<User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Writes only the supplied profile fields in a single write.
    async fn update_profile(
        &self,
        id: &ObjectId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError>;

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;
}
