use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{LoginRequest, RegisterRequest, TokenResponse, UpdateUserRequest, UserResponse},
    repo::UserStore,
    repo_types::{NewUser, User, UserChanges},
    validation::{check_email, check_full_name, check_password_strength, normalize_email},
};
use crate::{
    auth::{jwt::TokenService, password::PasswordHasher},
    error::AppError,
};

/// Registration, login and profile management on top of a [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AppError> {
        let full_name = check_full_name(&req.full_name)?;
        let email = check_email(&req.email)?;

        // Fast path only; the store's unique constraint decides races.
        if self.store.find_by_email(&email).await?.is_some() {
            warn!("email already registered");
            return Err(AppError::DuplicateResource("email"));
        }

        check_password_strength(&req.password)?;
        let password_hash = self.hash_password(req.password).await?;

        let now = OffsetDateTime::now_utc();
        let user = self
            .store
            .insert(NewUser {
                full_name,
                email,
                password_hash,
                is_active: req.is_active,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user.into())
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, AppError> {
        let email = normalize_email(&req.email);
        let user = self.store.find_by_email(&email).await?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let verified = self.verify_password(req.password, stored_hash).await?;

        let user = match user {
            Some(u) if verified => u,
            _ => {
                warn!("login rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        let access_token = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, "user logged in");
        Ok(TokenResponse::bearer(access_token, user.into()))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<UserResponse, AppError> {
        let user = self.find(id).await?;
        Ok(user.into())
    }

    #[instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        id: &str,
        changes: UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        let user = self.find(id).await?;
        let full_name = changes
            .full_name
            .as_deref()
            .map(check_full_name)
            .transpose()?;

        let password_hash = match changes.password {
            Some(password) => {
                check_password_strength(&password)?;
                Some(self.hash_password(password).await?)
            }
            None => None,
        };
        let password_changed = password_hash.is_some();

        let updated = self
            .store
            .update(
                user.id,
                UserChanges {
                    full_name,
                    password_hash,
                },
            )
            .await?;

        info!(user_id = %updated.id, password_changed, "user updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = parse_id(id)?;
        self.store.delete(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }

    async fn find(&self, id: &str) -> Result<User, AppError> {
        let id = parse_id(id)?;
        self.store.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn hash_password(&self, plain: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(AppError::unexpected)?
            .map_err(AppError::Unexpected)
    }

    /// `None` runs a dummy verification so unknown emails cost the same as wrong passwords.
    async fn verify_password(&self, plain: String, hash: Option<String>) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&plain, &hash),
            None => hasher.verify_dummy(&plain),
        })
        .await
        .map_err(AppError::unexpected)
    }
}

/// Ids that are not well-formed cannot name a stored user.
fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::NotFound)
}
