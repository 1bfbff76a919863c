//! Hex-string handling for `ObjectId`s on the JSON side of the API.
//!
//! Stored documents keep native `ObjectId`s; requests and responses carry the
//! 24-character hex form.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid ID format")]
pub struct InvalidObjectId;

/// Accepts exactly 24 hexadecimal characters.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, InvalidObjectId> {
    if raw.len() != 24 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(InvalidObjectId);
    }
    ObjectId::parse_str(raw).map_err(|_| InvalidObjectId)
}

pub fn is_valid_object_id(raw: &str) -> bool {
    parse_object_id(raw).is_ok()
}

/// Hex string out, strict 24-character hex in.
pub mod hex {
    use super::*;

    pub use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string as serialize;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ObjectId, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_object_id(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod hex_option {
    use super::*;

    pub fn serialize<S: Serializer>(
        id: &Option<ObjectId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.serialize_some(&id.to_hex()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ObjectId>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => parse_object_id(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
