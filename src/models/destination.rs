use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::object_id;

pub const TITLE_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TravelStatus {
    #[default]
    #[serde(rename = "to-visit")]
    ToVisit,
    #[serde(rename = "visited")]
    Visited,
}

impl TravelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelStatus::ToVisit => "to-visit",
            TravelStatus::Visited => "visited",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "to-visit" => Some(TravelStatus::ToVisit),
            "visited" => Some(TravelStatus::Visited),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(rename = "_id", with = "object_id::hex")]
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
    pub rating: Option<u8>,
    #[serde(
        default,
        with = "object_id::hex_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<ObjectId>,
    #[serde(default)]
    pub is_admin_created: bool,
    #[serde(
        default,
        with = "object_id::hex_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_destination_id: Option<ObjectId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Destination {
    /// Trims the free-text fields and checks the field-level constraints.
    pub fn sanitize(&mut self) -> Result<(), ApiError> {
        trim_in_place(&mut self.description);
        trim_in_place(&mut self.notes);
        check_title(&mut self.title)?;
        check_required(&mut self.country, "Country is required")?;
        check_required(&mut self.image_url, "Image URL is required")?;
        check_rating(self.rating)
    }

    /// Builds the caller's personal copy of an admin-created destination.
    pub fn personal_copy(&self, owner: ObjectId, now: DateTime<Utc>) -> Destination {
        Destination {
            id: ObjectId::new(),
            title: self.title.clone(),
            country: self.country.clone(),
            description: self.description.clone(),
            notes: self.notes.clone(),
            status: self.status,
            image_url: self.image_url.clone(),
            coordinates: self.coordinates,
            tags: self.tags.clone(),
            featured: false,
            rating: self.rating,
            user_id: Some(owner),
            is_admin_created: false,
            parent_destination_id: Some(self.id),
            created_at: now,
            updated_at: now,
        }
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn check_required(value: &mut String, message: &str) -> Result<(), ApiError> {
    trim_in_place(value);
    if value.is_empty() {
        return Err(ApiError::Validation(message.to_string()));
    }
    Ok(())
}

fn check_title(title: &mut String) -> Result<(), ApiError> {
    check_required(title, "Title is required")?;
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ApiError::Validation(
            "Title cannot exceed 100 characters".to_string(),
        ));
    }
    Ok(())
}

fn check_rating(rating: Option<u8>) -> Result<(), ApiError> {
    match rating {
        Some(0) => Err(ApiError::Validation(
            "Rating must be at least 1".to_string(),
        )),
        Some(r) if r > 5 => Err(ApiError::Validation(
            "Rating cannot exceed 5".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Body of `POST /api/destinations`. Unknown fields (`_id`, `createdAt`, ...)
/// are dropped by deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDestination {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(
        default,
        with = "object_id::hex_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<ObjectId>,
    #[serde(default)]
    pub is_admin_created: bool,
}

impl NewDestination {
    pub fn into_destination(self, owner: ObjectId, now: DateTime<Utc>) -> Destination {
        Destination {
            id: ObjectId::new(),
            title: self.title,
            country: self.country,
            description: self.description,
            notes: self.notes,
            status: self.status,
            image_url: self.image_url,
            coordinates: self.coordinates,
            tags: self.tags,
            featured: false,
            rating: self.rating,
            user_id: Some(owner),
            is_admin_created: self.is_admin_created,
            parent_destination_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `PUT /api/destinations/:id`. Ownership, lineage and the featured
/// flag are not part of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TravelStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl DestinationPatch {
    /// Same field rules as [`Destination::sanitize`], applied to the supplied
    /// fields only. A stored record stays valid after a sanitized patch.
    pub fn sanitize(&mut self) -> Result<(), ApiError> {
        if let Some(title) = self.title.as_mut() {
            check_title(title)?;
        }
        if let Some(country) = self.country.as_mut() {
            check_required(country, "Country is required")?;
        }
        if let Some(image_url) = self.image_url.as_mut() {
            check_required(image_url, "Image URL is required")?;
        }
        if let Some(description) = self.description.as_mut() {
            trim_in_place(description);
        }
        if let Some(notes) = self.notes.as_mut() {
            trim_in_place(notes);
        }
        check_rating(self.rating)
    }

    pub fn apply_to(self, destination: &mut Destination) {
        if let Some(title) = self.title {
            destination.title = title;
        }
        if let Some(country) = self.country {
            destination.country = country;
        }
        if let Some(description) = self.description {
            destination.description = description;
        }
        if let Some(notes) = self.notes {
            destination.notes = notes;
        }
        if let Some(status) = self.status {
            destination.status = status;
        }
        if let Some(image_url) = self.image_url {
            destination.image_url = image_url;
        }
        if let Some(coordinates) = self.coordinates {
            destination.coordinates = Some(coordinates);
        }
        if let Some(tags) = self.tags {
            destination.tags = tags;
        }
        if let Some(rating) = self.rating {
            destination.rating = Some(rating);
        }
    }
}

/// Raw query string of `GET /api/destinations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DestinationQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub country: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: usize,
    pub visited: usize,
    pub to_visit: usize,
    pub countries: usize,
    pub progress: usize,
}
