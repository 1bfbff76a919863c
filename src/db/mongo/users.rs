use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ReturnDocument,
    Collection, Database,
};

use super::documents::UserDocument;
use super::{map_write_error, USERS_COLLECTION};
use crate::db::repository::{StoreError, UserRepository};
use crate::models::user::{ProfileChanges, User, UserRole};

/// Uniqueness of email and of the admin role is enforced by the
/// `unique_email` and `single_admin` indexes created at startup.
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(database: &Database) -> Self {
        MongoUserRepository {
            collection: database.collection(USERS_COLLECTION),
        }
    }
}

/// Update document for the supplied profile fields. A cleared avatar is
/// removed from the stored record.
fn profile_update_document(changes: &ProfileChanges) -> Document {
    let mut set = Document::new();
    let mut unset = Document::new();
    if let Some(name) = &changes.name {
        set.insert("name", name.as_str());
    }
    if let Some(email) = &changes.email {
        set.insert("email", email.as_str());
    }
    match &changes.avatar {
        Some(Some(avatar)) => {
            set.insert("avatar", avatar.as_str());
        }
        Some(None) => {
            unset.insert("avatar", "");
        }
        None => {}
    }

    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        self.collection
            .insert_one(UserDocument::from(user))
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self
            .collection
            .find_one(doc! {"_id": id})
            .await?
            .map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .collection
            .find_one(doc! {"email": email})
            .await?
            .map(User::from))
    }

    async fn find_admin(&self) -> Result<Option<User>, StoreError> {
        Ok(self
            .collection
            .find_one(doc! {"role": UserRole::Admin.as_str()})
            .await?
            .map(User::from))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let documents: Vec<UserDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(User::from).collect())
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        // MongoDB rejects an empty update document.
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }
        Ok(self
            .collection
            .find_one_and_update(doc! {"_id": id}, profile_update_document(changes))
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_write_error)?
            .map(User::from))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! {"_id": id}).await?;
        Ok(result.deleted_count == 1)
    }
}
