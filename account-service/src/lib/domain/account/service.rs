use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::AuthResult;
use crate::account::models::LoginCommand;
use crate::account::models::Password;
use crate::account::models::RegisterCommand;
use crate::account::models::UpdateProfileCommand;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::ports::AccountServicePort;
use crate::account::ports::UserRepository;

/// Domain service implementation for account operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
/// The only component allowed to mutate user records.
pub struct AccountService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AccountService<UR>
where
    UR: UserRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    /// Hash on the blocking pool; Argon2 is deliberately slow.
    async fn hash_password(&self, password: Password) -> Result<String, AccountError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await?
            .map_err(AccountError::from)
    }

    async fn find_existing(&self, id: &UserId) -> Result<User, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<UR> AccountServicePort for AccountService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthResult, AccountError> {
        // Early exit only; the store's unique index is what actually holds
        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(AccountError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self.hash_password(command.password).await?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created_user = self.repository.create(user).await?;

        let token = self
            .authenticator
            .issue_token(created_user.id, created_user.email.as_str())?;

        tracing::info!(user_id = %created_user.id, "Account registered");

        Ok(AuthResult {
            user: created_user,
            token,
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthResult, AccountError> {
        let Some(user) = self.repository.find_by_email(&command.email).await? else {
            tracing::debug!("Login rejected: no account for email");
            return Err(AccountError::InvalidCredentials);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let stored_hash = user.password_hash.clone();
        let user_id = user.id;
        let email = user.email.clone();

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(password.expose(), &stored_hash, user_id, email.as_str())
        })
        .await?
        .map_err(|e| {
            tracing::debug!(user_id = %user.id, error = %e, "Login rejected");
            AccountError::from(e)
        })?;

        tracing::info!(user_id = %user.id, "Account logged in");

        Ok(AuthResult {
            user,
            token: result.access_token,
        })
    }

    async fn get_profile(&self, id: &UserId) -> Result<User, AccountError> {
        self.find_existing(id).await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<User, AccountError> {
        let mut user = self.find_existing(id).await?;

        if let Some(new_email) = command.email {
            if new_email != user.email {
                if let Some(owner) = self.repository.find_by_email(&new_email).await? {
                    if owner.id != user.id {
                        return Err(AccountError::EmailAlreadyExists(new_email.to_string()));
                    }
                }
            }
            user.email = new_email;
        }

        if let Some(new_name) = command.name {
            user.name = new_name;
        }

        user.updated_at = Utc::now();

        let updated_user = self.repository.update(user).await?;

        tracing::info!(user_id = %updated_user.id, "Profile updated");

        Ok(updated_user)
    }
}
