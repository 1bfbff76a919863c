use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use log::{debug, error};

use crate::errors::ApiError;
use crate::models::object_id::parse_object_id;
use crate::models::user::Actor;
use crate::state::AppState;

/// Header naming the calling user by id.
pub const ACTOR_HEADER: &str = "X-User-Id";

fn unauthenticated() -> ApiError {
    ApiError::Unauthorized("Authentication required".to_string())
}

/// Resolves the caller from `X-User-Id` against the user store. The role comes
/// from the stored record.
impl FromRequest for Actor {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let header = req
            .headers()
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string());

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                error!("AppState is not registered");
                ApiError::Internal("application state missing".to_string())
            })?;
            let raw = header.ok_or_else(unauthenticated)?;
            let id = parse_object_id(&raw).map_err(|_| {
                debug!("rejected malformed {} header", ACTOR_HEADER);
                unauthenticated()
            })?;

            state.users.resolve_actor(&id).await?.ok_or_else(|| {
                debug!("no user for {} {}", ACTOR_HEADER, id);
                unauthenticated()
            })
        })
    }
}
