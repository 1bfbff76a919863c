use log::{info, warn};
use mongodb::{
    bson::doc,
    error::{Error, ErrorKind, WriteError, WriteFailure},
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Database, IndexModel,
};
use std::sync::Arc;
use std::time::Duration;

use crate::db::repository::{DuplicateKey, StoreError};

mod destinations;
mod documents;
mod users;

pub use destinations::MongoDestinationRepository;
pub use users::MongoUserRepository;

pub const DESTINATIONS_COLLECTION: &str = "destinations";
pub const USERS_COLLECTION: &str = "users";

const UNIQUE_EMAIL_INDEX: &str = "unique_email";
const SINGLE_ADMIN_INDEX: &str = "single_admin";
const DUPLICATE_KEY_CODE: i32 = 11000;

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, Error> {
    info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    // Stable API, MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    match client
        .database("admin")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => info!("Connected to MongoDB and verified with ping"),
        Err(e) => {
            warn!("Connected to MongoDB but ping failed: {}", e);
            warn!("The API may still work, but storage calls can fail");
        }
    }

    Ok(Arc::new(client))
}

/// Creates the indexes backing the account uniqueness rules. Safe to run on
/// every start.
pub async fn ensure_indexes(database: &Database) -> Result<(), Error> {
    let users = database.collection::<mongodb::bson::Document>(USERS_COLLECTION);

    let unique_email = IndexModel::builder()
        .keys(doc! {"email": 1})
        .options(
            IndexOptions::builder()
                .name(UNIQUE_EMAIL_INDEX.to_string())
                .unique(true)
                .build(),
        )
        .build();
    let single_admin = IndexModel::builder()
        .keys(doc! {"role": 1})
        .options(
            IndexOptions::builder()
                .name(SINGLE_ADMIN_INDEX.to_string())
                .unique(true)
                .partial_filter_expression(doc! {"role": "admin"})
                .build(),
        )
        .build();
    users.create_indexes(vec![unique_email, single_admin]).await?;

    let destinations = database.collection::<mongodb::bson::Document>(DESTINATIONS_COLLECTION);
    destinations
        .create_index(IndexModel::builder().keys(doc! {"userId": 1}).build())
        .await?;

    info!("MongoDB indexes are in place");
    Ok(())
}

/// Maps a failed write to a `StoreError`, recognising duplicate-key
/// violations of the user indexes.
pub(crate) fn map_write_error(err: Error) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(WriteError { code, message, .. }))
            if *code == DUPLICATE_KEY_CODE =>
        {
            if message.contains(SINGLE_ADMIN_INDEX) {
                StoreError::Duplicate(DuplicateKey::Admin)
            } else {
                StoreError::Duplicate(DuplicateKey::Email)
            }
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
