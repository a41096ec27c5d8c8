use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    repo_types::User,
    validation::{check_email, check_full_name},
};
use crate::error::ValidationError;

fn default_true() -> bool {
    true
}

/// Request body for user registration.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl RegisterRequest {
    /// Shape checks done before the service runs; the password policy lives in the service.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.full_name = check_full_name(&self.full_name)?;
        self.email = check_email(&self.email)?;
        Ok(self)
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Request body for login.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.email = check_email(&self.email)?;
        Ok(self)
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Request body for a profile update; absent fields are left unchanged.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if let Some(name) = self.full_name.as_deref() {
            self.full_name = Some(check_full_name(name)?);
        }
        Ok(self)
    }
}

impl fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("full_name", &self.full_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserResponse,
}

impl TokenResponse {
    pub fn bearer(access_token: String, user: UserResponse) -> Self {
        Self {
            access_token,
            token_type: "bearer",
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn user_response_drops_password_hash() {
        let user = sample_user();
        let id = user.id;
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["email"], "jane@example.com");
        assert_eq!(json["is_active"], true);
        assert!(json.get("password_hash").is_none());
        assert!(json.get("_id").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn debug_output_never_shows_secrets() {
        let user = sample_user();
        assert!(!format!("{user:?}").contains("argon2"));

        let login = LoginRequest {
            email: "jane@example.com".into(),
            password: "Abc123!@".into(),
        };
        assert!(!format!("{login:?}").contains("Abc123!@"));

        let update = UpdateUserRequest {
            full_name: None,
            password: Some("Abc123!@".into()),
        };
        assert!(!format!("{update:?}").contains("Abc123!@"));
    }

    #[test]
    fn register_request_rejects_unknown_fields() {
        let body = r#"{"full_name":"Jane Doe","email":"j@e.com","password":"x","role":"admin"}"#;
        assert!(serde_json::from_str::<RegisterRequest>(body).is_err());
    }

    #[test]
    fn register_request_normalizes_on_validate() {
        let body = r#"{"full_name":"  Jane Doe  ","email":" Jane@Example.com ","password":"Abc123!@"}"#;
        let req = serde_json::from_str::<RegisterRequest>(body)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(req.full_name, "Jane Doe");
        assert_eq!(req.email, "jane@example.com");
        assert!(req.is_active);
    }

    #[test]
    fn token_response_is_bearer() {
        let json = serde_json::to_value(TokenResponse::bearer(
            "tok".into(),
            UserResponse::from(sample_user()),
        ))
        .unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["access_token"], "tok");
        assert!(json["user"].get("password_hash").is_none());
    }
}
