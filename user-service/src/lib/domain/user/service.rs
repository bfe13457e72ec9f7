use std::sync::Arc;

use async_trait::async_trait;
use auth::Credential;
use auth::CredentialStore;
use auth::Identity;
use auth::PasswordHasher;
use auth::StoreError;
use chrono::Utc;

use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Also serves as the credential store for the authenticator and the
/// session guard.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher used for new registrations
    pub fn new(repository: Arc<UR>, password_hasher: PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    /// Lookup by raw login identifier. Identifiers that cannot be usernames
    /// are simply unknown.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        let Ok(username) = Username::new(identifier.to_string()) else {
            return Ok(None);
        };

        self.repository
            .find_by_username(&username)
            .await
            .map_err(|e| StoreError(e.to_string()))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let hasher = self.password_hasher.clone();
        let password = command.password;

        // Hashing is slow by design; keep it off the async workers.
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(password.expose()))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))??;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            full_name: command.full_name,
            password_hash,
            active: true,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user)
    }
}

#[async_trait]
impl<UR> CredentialStore for UserService<UR>
where
    UR: UserRepository,
{
    async fn find_credential(&self, identifier: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self
            .find_by_identifier(identifier)
            .await?
            .map(|user| user.credential()))
    }

    async fn find_identity(&self, identifier: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self
            .find_by_identifier(identifier)
            .await?
            .map(|user| user.identity()))
    }
}
