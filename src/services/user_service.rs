use std::sync::{Arc, OnceLock};

use log::{error, info, warn};
use mongodb::bson::oid::ObjectId;
use regex::Regex;

use crate::db::repository::UserRepository;
use crate::errors::{ApiError, ADMIN_EXISTS, USER_EXISTS};
use crate::models::timestamp_now;
use crate::models::user::{
    Actor, LoginRequest, ProfileChanges, ProfileUpdate, RegisterRequest, User, UserProfile,
    UserRole,
};

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, bcrypt_cost: u32) -> Self {
        UserService {
            repository,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, input: RegisterRequest) -> Result<UserProfile, ApiError> {
        let name = required(&input.name, "Name is required")?;
        let email = normalize_email(&input.email)?;
        if input.password.is_empty() {
            return Err(ApiError::Validation("Password is required".to_string()));
        }

        // Early answers for the common cases. The store re-checks both rules
        // atomically on insert.
        if input.role == UserRole::Admin && self.repository.find_admin().await?.is_some() {
            return Err(ApiError::Conflict(ADMIN_EXISTS.to_string()));
        }
        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict(USER_EXISTS.to_string()));
        }

        let password_hash = self.hash(&input.password).await?;
        let user = User {
            id: ObjectId::new(),
            email,
            name,
            avatar: None,
            password_hash,
            role: input.role,
            created_at: timestamp_now(),
        };
        self.repository.insert(&user).await?;

        info!("registered user {} with role {}", user.id, user.role.as_str());
        Ok(UserProfile::from(&user))
    }

    /// Unknown email and wrong password fail the same way.
    pub async fn login(&self, input: LoginRequest) -> Result<UserProfile, ApiError> {
        let email = input.email.trim().to_lowercase();
        let user = match self.repository.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("login rejected: unknown account");
                return Err(ApiError::invalid_credentials());
            }
        };

        let password = input.password;
        let hash = user.password_hash.clone();
        let verified = actix_web::web::block(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if !verified {
            warn!("login rejected for user {}", user.id);
            return Err(ApiError::invalid_credentials());
        }
        Ok(UserProfile::from(&user))
    }

    pub async fn list(&self) -> Result<Vec<UserProfile>, ApiError> {
        let users = self.repository.list().await?;
        Ok(users.iter().map(UserProfile::from).collect())
    }

    /// Destinations the user owned are kept.
    pub async fn delete(&self, actor: &Actor, id: &ObjectId) -> Result<(), ApiError> {
        if !actor.may_act_for(id) {
            warn!("user {} denied deleting user {}", actor.id, id);
            return Err(ApiError::Forbidden(
                "Not allowed to delete this user".to_string(),
            ));
        }
        if !self.repository.delete(id).await? {
            return Err(ApiError::user_not_found());
        }
        info!("user {} deleted by {}", id, actor.id);
        Ok(())
    }

    pub async fn update_profile(
        &self,
        actor: &Actor,
        id: &ObjectId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        if !actor.may_act_for(id) {
            return Err(ApiError::Forbidden(
                "Not allowed to update this user".to_string(),
            ));
        }
        let mut changes = ProfileChanges::default();
        if let Some(name) = update.name {
            changes.name = Some(required(&name, "Name is required")?);
        }
        if let Some(email) = update.email {
            changes.email = Some(normalize_email(&email)?);
        }
        if let Some(avatar) = update.avatar {
            let avatar = avatar.trim();
            changes.avatar = Some((!avatar.is_empty()).then(|| avatar.to_string()));
        }

        let user = self
            .repository
            .update_profile(id, &changes)
            .await?
            .ok_or_else(ApiError::user_not_found)?;
        Ok(UserProfile::from(&user))
    }

    /// Looks up the caller named by a request. `None` for unknown ids.
    pub async fn resolve_actor(&self, id: &ObjectId) -> Result<Option<Actor>, ApiError> {
        Ok(self
            .repository
            .find_by_id(id)
            .await?
            .map(|user| Actor::from(&user)))
    }

    async fn hash(&self, password: &str) -> Result<String, ApiError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        actix_web::web::block(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .map_err(|e| {
                error!("password hashing failed: {}", e);
                ApiError::Internal(e.to_string())
            })
    }
}

fn required(value: &str, message: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
            )
            .ok()
        })
        .as_ref()
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().map_or(false, |re| re.is_match(email))
}

/// Trims and lower-cases, then checks the address shape.
fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    Ok(email)
}
