use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserChanges};
use crate::error::AppError;

/// Persistence for user accounts.
///
/// Implementations must enforce email uniqueness themselves and report a
/// collision as [`AppError::DuplicateResource`]; callers only pre-check.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
    /// Applies `changes` and stamps `updated_at`; `NotFound` if `id` is unknown.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        // A unique violation on users_email_key surfaces as DuplicateResource.
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, full_name, email, password_hash, is_active, created_at, updated_at
            "#,
        )
        .bind(user.full_name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name     = COALESCE($2, full_name),
                password_hash = COALESCE($3, password_hash),
                updated_at    = GREATEST($4, created_at)
            WHERE id = $1
            RETURNING id, full_name, email, password_hash, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.full_name)
        .bind(changes.password_hash)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(&self.db)
        .await?;
        user.ok_or(AppError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
