use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use mongodb::bson::oid::ObjectId;

use crate::errors::ApiError;
use crate::models::object_id::parse_object_id;

/// The `{id}` path segment, validated as a 24-hex id before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub ObjectId);

impl FromRequest for PathId {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("id").unwrap_or_default();
        ready(
            parse_object_id(raw)
                .map(PathId)
                .map_err(|_| ApiError::invalid_id()),
        )
    }
}
