//! Stored shapes. Ids stay native `ObjectId`s and timestamps BSON dates; the
//! API models carry hex strings and RFC 3339 instead.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::destination::{Coordinates, Destination, TravelStatus};
use crate::models::user::{User, UserRole};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub country: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: TravelStatus,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ObjectId>,
    #[serde(default)]
    pub is_admin_created: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_destination_id: Option<ObjectId>,
    pub created_at: DateTime,
    #[serde(default)]
    pub updated_at: Option<DateTime>,
}

impl From<&Destination> for DestinationDocument {
    fn from(d: &Destination) -> Self {
        DestinationDocument {
            id: d.id,
            title: d.title.clone(),
            country: d.country.clone(),
            description: d.description.clone(),
            notes: d.notes.clone(),
            status: d.status,
            image_url: d.image_url.clone(),
            coordinates: d.coordinates,
            tags: d.tags.clone(),
            featured: d.featured,
            rating: d.rating.map(i32::from),
            user_id: d.user_id,
            is_admin_created: d.is_admin_created,
            parent_destination_id: d.parent_destination_id,
            created_at: DateTime::from_chrono(d.created_at),
            updated_at: Some(DateTime::from_chrono(d.updated_at)),
        }
    }
}

impl From<DestinationDocument> for Destination {
    fn from(doc: DestinationDocument) -> Self {
        let created_at = doc.created_at.to_chrono();
        Destination {
            id: doc.id,
            title: doc.title,
            country: doc.country,
            description: doc.description,
            notes: doc.notes,
            status: doc.status,
            image_url: doc.image_url,
            coordinates: doc.coordinates,
            tags: doc.tags,
            featured: doc.featured,
            // Out-of-range ratings written by other tools are dropped.
            rating: doc.rating.and_then(|r| u8::try_from(r).ok()),
            user_id: doc.user_id,
            is_admin_created: doc.is_admin_created,
            parent_destination_id: doc.parent_destination_id,
            created_at,
            updated_at: doc.updated_at.map(|t| t.to_chrono()).unwrap_or(created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub role: UserRole,
    pub created_at: DateTime,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        UserDocument {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: DateTime::from_chrono(user.created_at),
        }
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        User {
            id: doc.id,
            email: doc.email,
            name: doc.name,
            avatar: doc.avatar,
            password_hash: doc.password_hash,
            role: doc.role,
            created_at: doc.created_at.to_chrono(),
        }
    }
}
