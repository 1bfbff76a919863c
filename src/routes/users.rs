use actix_web::{web, HttpResponse};

use crate::errors::ApiError;
use crate::middleware::object_id::PathId;
use crate::models::user::{Actor, LoginRequest, ProfileUpdate, RegisterRequest};
use crate::state::AppState;

pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let profile = state.users.register(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(profile))
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let profile = state.users.login(input.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.users.list().await?))
}

pub async fn delete(
    state: web::Data<AppState>,
    id: PathId,
    actor: Actor,
) -> Result<HttpResponse, ApiError> {
    state.users.delete(&actor, &id.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn update_profile(
    state: web::Data<AppState>,
    id: PathId,
    actor: Actor,
    input: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, ApiError> {
    let profile = state
        .users
        .update_profile(&actor, &id.0, input.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
