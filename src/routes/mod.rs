use actix_web::web;

use crate::errors::{json_error_handler, query_error_handler};

pub mod destinations;
pub mod health;
pub mod users;

/// The full route table, shared by the server binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/", web::get().to(health::banner))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/users")
                        .route("/register", web::post().to(users::register))
                        .route("/login", web::post().to(users::login))
                        .route("", web::get().to(users::list))
                        .service(
                            web::resource("/{id}")
                                .route(web::delete().to(users::delete))
                                .route(web::put().to(users::update_profile)),
                        ),
                )
                .service(
                    web::scope("/destinations")
                        .route("/user/{id}/stats", web::get().to(destinations::user_stats))
                        .route("/{id}/featured", web::patch().to(destinations::toggle_featured))
                        .route("/{id}/copy", web::post().to(destinations::copy))
                        .service(
                            web::resource("")
                                .route(web::get().to(destinations::list))
                                .route(web::post().to(destinations::create)),
                        )
                        .service(
                            web::resource("/{id}")
                                .route(web::get().to(destinations::get_by_id))
                                .route(web::put().to(destinations::update))
                                .route(web::delete().to(destinations::delete)),
                        ),
                ),
        );
}
