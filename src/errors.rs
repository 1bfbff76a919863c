use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse, ResponseError,
};
use log::error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::repository::{DuplicateKey, StoreError};

pub const INVALID_ID: &str = "Invalid ID format";
pub const ADMIN_EXISTS: &str = "An admin already exists.";
pub const USER_EXISTS: &str = "User already exists.";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const DESTINATION_NOT_FOUND: &str = "Destination not found";
pub const USER_NOT_FOUND: &str = "User not found";

/// Every failure a handler or service can report to a caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_id() -> Self {
        ApiError::Validation(INVALID_ID.to_string())
    }

    pub fn destination_not_found() -> Self {
        ApiError::NotFound(DESTINATION_NOT_FOUND.to_string())
    }

    pub fn user_not_found() -> Self {
        ApiError::NotFound(USER_NOT_FOUND.to_string())
    }

    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
    }
}

/// Body written for every failed request: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            // Conflicts share 400 with validation failures on this API.
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Internal(detail) => {
                error!("internal error: {}", detail);
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error: message,
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(DuplicateKey::Admin) => {
                ApiError::Conflict(ADMIN_EXISTS.to_string())
            }
            StoreError::Duplicate(DuplicateKey::Email) => {
                ApiError::Conflict(USER_EXISTS.to_string())
            }
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}
