use actix_web::ResponseError;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::errors::{ApiError, ErrorBody};
use crate::middleware::actor::ACTOR_HEADER;
use crate::models::destination::{Destination, DestinationPatch, NewDestination, UserStats};
use crate::models::envelope::Envelope;
use crate::models::user::{LoginRequest, ProfileUpdate, RegisterRequest, UserProfile};
use crate::services::query::DestinationFilter;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Invalid ID format")]
    InvalidId,
    #[error("not logged in")]
    NotLoggedIn,
}

impl ClientError {
    /// HTTP status of a server-reported failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Server errors seen through the same lens an HTTP caller would have.
impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        let message = match &err {
            ApiError::Internal(_) => "Server error".to_string(),
            other => other.to_string(),
        };
        ClientError::Api {
            status: err.status_code().as_u16(),
            message,
        }
    }
}

/// Remote operations the mirror store relies on. `caller` is the id sent as
/// the request's identity.
#[async_trait]
pub trait TravelApi: Send + Sync {
    async fn list_destinations(
        &self,
        filter: &DestinationFilter,
    ) -> Result<Vec<Destination>, ClientError>;

    async fn create_destination(
        &self,
        caller: &ObjectId,
        input: &NewDestination,
    ) -> Result<Destination, ClientError>;

    async fn update_destination(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
        patch: &DestinationPatch,
    ) -> Result<Destination, ClientError>;

    async fn delete_destination(&self, caller: &ObjectId, id: &ObjectId)
        -> Result<(), ClientError>;

    async fn toggle_featured(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
    ) -> Result<Destination, ClientError>;

    async fn copy_destination(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
    ) -> Result<Destination, ClientError>;

    async fn user_stats(&self, owner: &ObjectId) -> Result<UserStats, ClientError>;

    async fn register(&self, input: &RegisterRequest) -> Result<UserProfile, ClientError>;

    async fn login(&self, input: &LoginRequest) -> Result<UserProfile, ClientError>;

    async fn list_users(&self) -> Result<Vec<UserProfile>, ClientError>;

    async fn delete_user(&self, caller: &ObjectId, id: &ObjectId) -> Result<(), ClientError>;

    async fn update_profile(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ClientError>;
}

/// `TravelApi` over HTTP.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpApi {
    /// `base` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(HttpApi {
            client: reqwest::Client::new(),
            base,
        })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        caller: Option<&ObjectId>,
    ) -> Result<RequestBuilder, ClientError> {
        let url = self.base.join(path)?;
        let builder = self.client.request(method, url);
        Ok(match caller {
            Some(id) => builder.header(ACTOR_HEADER, id.to_hex()),
            None => builder,
        })
    }
}

async fn failure(response: Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(failure(response).await);
    }
    Ok(response.json::<T>().await?)
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    read_json::<Envelope<T>>(response).await.map(|e| e.data)
}

async fn read_empty(response: Response) -> Result<(), ClientError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(failure(response).await)
}

#[async_trait]
impl TravelApi for HttpApi {
    async fn list_destinations(
        &self,
        filter: &DestinationFilter,
    ) -> Result<Vec<Destination>, ClientError> {
        let response = self
            .request(Method::GET, "api/destinations", None)?
            .query(&filter.to_query_pairs())
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn create_destination(
        &self,
        caller: &ObjectId,
        input: &NewDestination,
    ) -> Result<Destination, ClientError> {
        let response = self
            .request(Method::POST, "api/destinations", Some(caller))?
            .json(input)
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn update_destination(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
        patch: &DestinationPatch,
    ) -> Result<Destination, ClientError> {
        let path = format!("api/destinations/{}", id.to_hex());
        let response = self
            .request(Method::PUT, &path, Some(caller))?
            .json(patch)
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn delete_destination(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
    ) -> Result<(), ClientError> {
        let path = format!("api/destinations/{}", id.to_hex());
        let response = self.request(Method::DELETE, &path, Some(caller))?.send().await?;
        read_empty(response).await
    }

    async fn toggle_featured(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
    ) -> Result<Destination, ClientError> {
        let path = format!("api/destinations/{}/featured", id.to_hex());
        let response = self.request(Method::PATCH, &path, Some(caller))?.send().await?;
        read_envelope(response).await
    }

    async fn copy_destination(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
    ) -> Result<Destination, ClientError> {
        let path = format!("api/destinations/{}/copy", id.to_hex());
        let response = self.request(Method::POST, &path, Some(caller))?.send().await?;
        read_envelope(response).await
    }

    async fn user_stats(&self, owner: &ObjectId) -> Result<UserStats, ClientError> {
        let path = format!("api/destinations/user/{}/stats", owner.to_hex());
        let response = self.request(Method::GET, &path, None)?.send().await?;
        read_envelope(response).await
    }

    async fn register(&self, input: &RegisterRequest) -> Result<UserProfile, ClientError> {
        let response = self
            .request(Method::POST, "api/users/register", None)?
            .json(input)
            .send()
            .await?;
        read_json(response).await
    }

    async fn login(&self, input: &LoginRequest) -> Result<UserProfile, ClientError> {
        let response = self
            .request(Method::POST, "api/users/login", None)?
            .json(input)
            .send()
            .await?;
        read_json(response).await
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, ClientError> {
        let response = self.request(Method::GET, "api/users", None)?.send().await?;
        read_json(response).await
    }

    async fn delete_user(&self, caller: &ObjectId, id: &ObjectId) -> Result<(), ClientError> {
        let path = format!("api/users/{}", id.to_hex());
        let response = self.request(Method::DELETE, &path, Some(caller))?.send().await?;
        read_empty(response).await
    }

    async fn update_profile(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ClientError> {
        let path = format!("api/users/{}", id.to_hex());
        let response = self
            .request(Method::PUT, &path, Some(caller))?
            .json(update)
            .send()
            .await?;
        read_json(response).await
    }
}
