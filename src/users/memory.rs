use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::UserStore,
    repo_types::{NewUser, User, UserChanges},
};
use crate::error::AppError;

/// `UserStore` backed by a map; uniqueness is checked under the write lock,
/// like the unique index does for Postgres.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateResource("email"));
        }
        let stored = User {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(full_name) = changes.full_name {
            user.full_name = full_name;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = OffsetDateTime::now_utc().max(user.created_at);
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        let now = OffsetDateTime::now_utc();
        NewUser {
            full_name: "Jane Doe".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_enforces_unique_email() {
        let store = MemoryUserStore::default();
        store.insert(new_user("jane@example.com")).await.unwrap();
        let err = store.insert(new_user("jane@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateResource("email")));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id_are_not_found() {
        let store = MemoryUserStore::default();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.update(id, UserChanges::default()).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(store.delete(id).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn update_applies_only_given_fields() {
        let store = MemoryUserStore::default();
        let user = store.insert(new_user("jane@example.com")).await.unwrap();
        let changes = UserChanges {
            full_name: Some("Janet Doe".into()),
            password_hash: None,
        };
        let updated = store.update(user.id, changes).await.unwrap();
        assert_eq!(updated.full_name, "Janet Doe");
        assert_eq!(updated.password_hash, user.password_hash);
        assert!(updated.updated_at >= user.updated_at);
    }
}
