use actix_web::{web, HttpResponse};

use crate::errors::ApiError;
use crate::middleware::object_id::PathId;
use crate::models::destination::{DestinationPatch, DestinationQuery, NewDestination};
use crate::models::envelope::{Empty, Envelope};
use crate::models::user::Actor;
use crate::services::query::DestinationFilter;
use crate::state::AppState;

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<DestinationQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = DestinationFilter::from_query(query.into_inner())?;
    let destinations = state.destinations.list(&filter).await?;
    Ok(HttpResponse::Ok().json(Envelope::list(destinations)))
}

pub async fn get_by_id(
    state: web::Data<AppState>,
    id: PathId,
) -> Result<HttpResponse, ApiError> {
    let destination = state.destinations.get(&id.0).await?;
    Ok(HttpResponse::Ok().json(Envelope::data(destination)))
}

pub async fn create(
    state: web::Data<AppState>,
    actor: Actor,
    input: web::Json<NewDestination>,
) -> Result<HttpResponse, ApiError> {
    let destination = state.destinations.create(&actor, input.into_inner()).await?;
    Ok(HttpResponse::Created().json(Envelope::data(destination)))
}

pub async fn update(
    state: web::Data<AppState>,
    id: PathId,
    actor: Actor,
    input: web::Json<DestinationPatch>,
) -> Result<HttpResponse, ApiError> {
    let destination = state
        .destinations
        .update(&actor, &id.0, input.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(Envelope::data(destination)))
}

pub async fn delete(
    state: web::Data<AppState>,
    id: PathId,
    actor: Actor,
) -> Result<HttpResponse, ApiError> {
    state.destinations.delete(&actor, &id.0).await?;
    Ok(HttpResponse::Ok().json(Envelope::data(Empty {})))
}

pub async fn toggle_featured(
    state: web::Data<AppState>,
    id: PathId,
    actor: Actor,
) -> Result<HttpResponse, ApiError> {
    let destination = state.destinations.toggle_featured(&actor, &id.0).await?;
    Ok(HttpResponse::Ok().json(Envelope::data(destination)))
}

pub async fn copy(
    state: web::Data<AppState>,
    id: PathId,
    actor: Actor,
) -> Result<HttpResponse, ApiError> {
    let destination = state
        .destinations
        .copy_admin_destination(&actor, &id.0)
        .await?;
    Ok(HttpResponse::Created().json(Envelope::data(destination)))
}

/// `GET /user/{id}/stats`; `id` is the owner.
pub async fn user_stats(
    state: web::Data<AppState>,
    owner: PathId,
) -> Result<HttpResponse, ApiError> {
    let stats = state.destinations.user_stats(&owner.0).await?;
    Ok(HttpResponse::Ok().json(Envelope::data(stats)))
}
