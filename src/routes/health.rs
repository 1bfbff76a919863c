use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    storage: &'static str,
    version: &'static str,
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok",
        storage: state.storage,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn banner() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Travel bucket list API is running")
}
