use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

use travel_bucket_api::config::AppConfig;
use travel_bucket_api::routes;
use travel_bucket_api::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let config = AppConfig::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let state = match config.mongodb_uri.as_deref() {
        Some(uri) => AppState::with_mongo(uri, &config)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?,
        None => {
            warn!("MONGODB_URI is not set; using the in-memory store, data is lost on exit");
            AppState::in_memory(config.bcrypt_cost)
        }
    };
    let state = web::Data::new(state);

    info!("Binding to {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
