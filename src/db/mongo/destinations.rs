use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    options::ReturnDocument,
    Collection, Database,
};

use super::documents::DestinationDocument;
use super::{map_write_error, DESTINATIONS_COLLECTION};
use crate::db::repository::{DestinationRepository, StoreError};
use crate::models::destination::{Destination, DestinationPatch};
use crate::services::query::{DestinationFilter, StatusFilter};

pub struct MongoDestinationRepository {
    collection: Collection<DestinationDocument>,
}

impl MongoDestinationRepository {
    pub fn new(database: &Database) -> Self {
        MongoDestinationRepository {
            collection: database.collection(DESTINATIONS_COLLECTION),
        }
    }

    async fn find_many(&self, filter: Document) -> Result<Vec<Destination>, StoreError> {
        let cursor = self.collection.find(filter).await?;
        let documents: Vec<DestinationDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Destination::from).collect())
    }
}

/// The exact-match part of a list filter as a query document. `None` when
/// the filter cannot match anything.
fn scope_document(filter: &DestinationFilter) -> Option<Document> {
    let mut query = Document::new();
    if let Some(owner) = filter.owner_id {
        query.insert("userId", owner);
    }
    match &filter.status {
        StatusFilter::All => {}
        StatusFilter::Only(status) => {
            query.insert("status", status.as_str());
        }
        StatusFilter::Other(_) => return None,
    }
    if let Some(country) = filter.country.as_deref().filter(|c| !c.is_empty()) {
        query.insert("country", country);
    }
    Some(query)
}

/// `$set` update writing the supplied patch fields and the update time.
fn patch_update_document(
    patch: &DestinationPatch,
    at: DateTime<Utc>,
) -> Result<Document, StoreError> {
    let mut fields =
        bson::to_document(patch).map_err(|err| StoreError::Backend(err.to_string()))?;
    fields.insert("updatedAt", bson::DateTime::from_chrono(at));
    Ok(doc! {"$set": fields})
}

#[async_trait]
impl DestinationRepository for MongoDestinationRepository {
    async fn find(&self, filter: &DestinationFilter) -> Result<Vec<Destination>, StoreError> {
        match scope_document(filter) {
            Some(query) => self.find_many(query).await,
            None => Ok(Vec::new()),
        }
    }

    async fn find_by_owner(&self, owner: &ObjectId) -> Result<Vec<Destination>, StoreError> {
        self.find_many(doc! {"userId": owner}).await
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Destination>, StoreError> {
        Ok(self
            .collection
            .find_one(doc! {"_id": id})
            .await?
            .map(Destination::from))
    }

    async fn insert(&self, destination: &Destination) -> Result<(), StoreError> {
        self.collection
            .insert_one(DestinationDocument::from(destination))
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn update(
        &self,
        id: &ObjectId,
        patch: &DestinationPatch,
        at: DateTime<Utc>,
    ) -> Result<Option<Destination>, StoreError> {
        let update = patch_update_document(patch, at)?;
        Ok(self
            .collection
            .find_one_and_update(doc! {"_id": id}, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_write_error)?
            .map(Destination::from))
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Destination>, StoreError> {
        Ok(self
            .collection
            .find_one_and_delete(doc! {"_id": id})
            .await?
            .map(Destination::from))
    }

    async fn toggle_featured(
        &self,
        id: &ObjectId,
        at: DateTime<Utc>,
    ) -> Result<Option<Destination>, StoreError> {
        // Pipeline update so the flip happens server-side in one write.
        let pipeline = vec![doc! {
            "$set": {
                "featured": {"$not": ["$featured"]},
                "updatedAt": bson::DateTime::from_chrono(at),
            }
        }];
        Ok(self
            .collection
            .find_one_and_update(doc! {"_id": id}, pipeline)
            .return_document(ReturnDocument::After)
            .await?
            .map(Destination::from))
    }
}
