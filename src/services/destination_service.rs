use std::sync::Arc;

use log::{debug, info};
use mongodb::bson::oid::ObjectId;

use crate::db::repository::DestinationRepository;
use crate::errors::ApiError;
use crate::models::destination::{Destination, DestinationPatch, NewDestination, UserStats};
use crate::models::timestamp_now;
use crate::models::user::Actor;
use crate::services::query::{self, DestinationFilter};

#[derive(Clone)]
pub struct DestinationService {
    repository: Arc<dyn DestinationRepository>,
}

impl DestinationService {
    pub fn new(repository: Arc<dyn DestinationRepository>) -> Self {
        DestinationService { repository }
    }

    /// Every destination matching `filter`, in the filter's order.
    pub async fn list(&self, filter: &DestinationFilter) -> Result<Vec<Destination>, ApiError> {
        let candidates = self.repository.find(filter).await?;
        Ok(query::apply(candidates, filter))
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Destination, ApiError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(ApiError::destination_not_found)
    }

    pub async fn create(&self, actor: &Actor, input: NewDestination) -> Result<Destination, ApiError> {
        let owner = input.user_id.unwrap_or(actor.id);
        if !actor.is_admin() {
            if owner != actor.id {
                debug!("user {} tried to create a destination for {}", actor.id, owner);
                return Err(ApiError::Forbidden(
                    "Cannot create destinations for another user".to_string(),
                ));
            }
            if input.is_admin_created {
                return Err(ApiError::Forbidden(
                    "Only an admin can create shared destinations".to_string(),
                ));
            }
        }

        let mut destination = input.into_destination(owner, timestamp_now());
        destination.sanitize()?;
        self.repository.insert(&destination).await?;

        info!("destination {} created by {}", destination.id, actor.id);
        Ok(destination)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &ObjectId,
        mut patch: DestinationPatch,
    ) -> Result<Destination, ApiError> {
        let current = self.get(id).await?;
        ensure_can_modify(actor, &current)?;
        patch.sanitize()?;

        // Only the patched fields are written, so concurrent changes to
        // other fields (such as `featured`) survive.
        self.repository
            .update(id, &patch, timestamp_now())
            .await?
            .ok_or_else(ApiError::destination_not_found)
    }

    /// Removes the destination and returns it. Personal copies of it are
    /// left in place.
    pub async fn delete(&self, actor: &Actor, id: &ObjectId) -> Result<Destination, ApiError> {
        let destination = self.get(id).await?;
        ensure_can_modify(actor, &destination)?;

        let removed = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(ApiError::destination_not_found)?;
        info!("destination {} deleted by {}", id, actor.id);
        Ok(removed)
    }

    pub async fn toggle_featured(&self, actor: &Actor, id: &ObjectId) -> Result<Destination, ApiError> {
        if !actor.is_admin() {
            return Err(ApiError::Forbidden(
                "Only an admin can feature destinations".to_string(),
            ));
        }
        self.repository
            .toggle_featured(id, timestamp_now())
            .await?
            .ok_or_else(ApiError::destination_not_found)
    }

    pub async fn copy_admin_destination(
        &self,
        actor: &Actor,
        id: &ObjectId,
    ) -> Result<Destination, ApiError> {
        let source = self.get(id).await?;
        if !source.is_admin_created {
            return Err(ApiError::Validation(
                "Only admin destinations can be copied".to_string(),
            ));
        }

        let copy = source.personal_copy(actor.id, timestamp_now());
        self.repository.insert(&copy).await?;

        info!("destination {} copied to {} for {}", id, copy.id, actor.id);
        Ok(copy)
    }

    /// Counts over the destinations `owner` owns. Shared admin destinations
    /// they have not copied are not included.
    pub async fn user_stats(&self, owner: &ObjectId) -> Result<UserStats, ApiError> {
        let owned = self.repository.find_by_owner(owner).await?;
        Ok(query::user_stats(&owned))
    }
}

fn ensure_can_modify(actor: &Actor, destination: &Destination) -> Result<(), ApiError> {
    if actor.is_admin() {
        return Ok(());
    }
    if destination.is_admin_created {
        return Err(ApiError::Forbidden(
            "Only an admin can change shared destinations".to_string(),
        ));
    }
    if destination.user_id != Some(actor.id) {
        debug!("user {} denied access to destination {}", actor.id, destination.id);
        return Err(ApiError::Forbidden(
            "Not allowed to change this destination".to_string(),
        ));
    }
    Ok(())
}
