#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use travel_bucket_api::client::api::{ClientError, TravelApi};
use travel_bucket_api::errors::ApiError;
use travel_bucket_api::models::destination::{
    Destination, DestinationPatch, NewDestination, UserStats,
};
use travel_bucket_api::models::user::{
    Actor, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile, UserRole,
};
use travel_bucket_api::routes;
use travel_bucket_api::services::query::DestinationFilter;
use travel_bucket_api::state::AppState;

/// Lowest cost bcrypt accepts, to keep the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            state: AppState::in_memory(TEST_BCRYPT_COST),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(routes::configure)
    }

    pub async fn register(&self, email: &str, role: UserRole) -> UserProfile {
        self.state
            .users
            .register(RegisterRequest {
                name: "Test User".to_string(),
                email: email.to_string(),
                password: "password123".to_string(),
                role,
            })
            .await
            .expect("register test user")
    }

    pub async fn seed_destination(
        &self,
        owner: &UserProfile,
        title: &str,
        country: &str,
        admin_created: bool,
    ) -> Destination {
        let actor = Actor {
            id: owner.id,
            role: owner.role,
        };
        self.state
            .destinations
            .create(&actor, new_destination(title, country, admin_created))
            .await
            .expect("seed destination")
    }

    pub fn local_api(&self) -> LocalApi {
        LocalApi {
            state: self.state.clone(),
        }
    }
}

pub fn new_destination(title: &str, country: &str, admin_created: bool) -> NewDestination {
    NewDestination {
        title: title.to_string(),
        country: country.to_string(),
        description: format!("A trip to {}", country),
        image_url: format!("https://img.example/{}.jpg", title.to_lowercase()),
        is_admin_created: admin_created,
        ..Default::default()
    }
}

/// `TravelApi` that calls the services in-process, so mirror tests run
/// without a socket.
#[derive(Clone)]
pub struct LocalApi {
    state: AppState,
}

impl LocalApi {
    async fn actor(&self, caller: &ObjectId) -> Result<Actor, ClientError> {
        self.state
            .users
            .resolve_actor(caller)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()).into())
    }
}

#[async_trait]
impl TravelApi for LocalApi {
    async fn list_destinations(
        &self,
        filter: &DestinationFilter,
    ) -> Result<Vec<Destination>, ClientError> {
        Ok(self.state.destinations.list(filter).await?)
    }

    async fn create_destination(
        &self,
        caller: &ObjectId,
        input: &NewDestination,
    ) -> Result<Destination, ClientError> {
        let actor = self.actor(caller).await?;
        Ok(self.state.destinations.create(&actor, input.clone()).await?)
    }

    async fn update_destination(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
        patch: &DestinationPatch,
    ) -> Result<Destination, ClientError> {
        let actor = self.actor(caller).await?;
        Ok(self
            .state
            .destinations
            .update(&actor, id, patch.clone())
            .await?)
    }

    async fn delete_destination(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
    ) -> Result<(), ClientError> {
        let actor = self.actor(caller).await?;
        self.state.destinations.delete(&actor, id).await?;
        Ok(())
    }

    async fn toggle_featured(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
    ) -> Result<Destination, ClientError> {
        let actor = self.actor(caller).await?;
        Ok(self.state.destinations.toggle_featured(&actor, id).await?)
    }

    async fn copy_destination(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
    ) -> Result<Destination, ClientError> {
        let actor = self.actor(caller).await?;
        Ok(self
            .state
            .destinations
            .copy_admin_destination(&actor, id)
            .await?)
    }

    async fn user_stats(&self, owner: &ObjectId) -> Result<UserStats, ClientError> {
        Ok(self.state.destinations.user_stats(owner).await?)
    }

    async fn register(&self, input: &RegisterRequest) -> Result<UserProfile, ClientError> {
        Ok(self.state.users.register(input.clone()).await?)
    }

    async fn login(&self, input: &LoginRequest) -> Result<UserProfile, ClientError> {
        Ok(self.state.users.login(input.clone()).await?)
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, ClientError> {
        Ok(self.state.users.list().await?)
    }

    async fn delete_user(&self, caller: &ObjectId, id: &ObjectId) -> Result<(), ClientError> {
        let actor = self.actor(caller).await?;
        self.state.users.delete(&actor, id).await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        caller: &ObjectId,
        id: &ObjectId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ClientError> {
        let actor = self.actor(caller).await?;
        Ok(self
            .state
            .users
            .update_profile(&actor, id, update.clone())
            .await?)
    }
}
