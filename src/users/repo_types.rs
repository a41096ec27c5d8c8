use std::fmt;

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Clone, FromRow)]
pub struct User {
    pub id: Uuid,                   // assigned by the store
    pub full_name: String,          // 3-30 chars
    pub email: String,              // trimmed, lowercased, unique
    pub password_hash: String,      // argon2 PHC string, never exposed
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("is_active", &self.is_active)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Fields of a user about to be inserted.
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Default)]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub password_hash: Option<String>,
}
