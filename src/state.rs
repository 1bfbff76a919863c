use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::memory::{MemoryDestinationRepository, MemoryUserRepository};
use crate::db::mongo::{self, MongoDestinationRepository, MongoUserRepository};
use crate::services::destination_service::DestinationService;
use crate::services::user_service::UserService;

/// Shared application state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub destinations: DestinationService,
    pub users: UserService,
    /// `"mongodb"` or `"memory"`, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    pub fn in_memory(bcrypt_cost: u32) -> Self {
        AppState {
            destinations: DestinationService::new(Arc::new(MemoryDestinationRepository::new())),
            users: UserService::new(Arc::new(MemoryUserRepository::new()), bcrypt_cost),
            storage: "memory",
        }
    }

    pub async fn with_mongo(uri: &str, config: &AppConfig) -> Result<Self, mongodb::error::Error> {
        let client = mongo::create_mongo_client(uri).await?;
        let database = client.database(&config.database);
        mongo::ensure_indexes(&database).await?;

        Ok(AppState {
            destinations: DestinationService::new(Arc::new(MongoDestinationRepository::new(
                &database,
            ))),
            users: UserService::new(
                Arc::new(MongoUserRepository::new(&database)),
                config.bcrypt_cost,
            ),
            storage: "mongodb",
        })
    }
}
