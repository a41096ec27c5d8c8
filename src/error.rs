use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

/// Password strength rules, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    TooShort,
    ContainsPassword,
    MissingLowercase,
    MissingUppercase,
    MissingDigit,
    MissingSpecial,
}

impl PasswordRule {
    pub fn code(self) -> &'static str {
        match self {
            PasswordRule::TooShort => "too_short",
            PasswordRule::ContainsPassword => "contains_password",
            PasswordRule::MissingLowercase => "missing_lowercase",
            PasswordRule::MissingUppercase => "missing_uppercase",
            PasswordRule::MissingDigit => "missing_digit",
            PasswordRule::MissingSpecial => "missing_special",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PasswordRule::TooShort => "Password must be at least 8 characters long",
            PasswordRule::ContainsPassword => "Password cannot contain the word \"password\"",
            PasswordRule::MissingLowercase => "Password must contain at least one lowercase letter",
            PasswordRule::MissingUppercase => "Password must contain at least one uppercase letter",
            PasswordRule::MissingDigit => "Password must contain at least one digit",
            PasswordRule::MissingSpecial => "Password must contain at least one special character",
        }
    }
}

/// Business-level input validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", .0.message())]
    Password(PasswordRule),
    #[error("{field}: {message}")]
    Field {
        field: &'static str,
        message: String,
    },
    #[error("{0}")]
    Body(String),
}

impl ValidationError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field,
            message: message.into(),
        }
    }

    fn detail(&self) -> Value {
        match self {
            ValidationError::Password(rule) => json!({ "field": "password", "rule": rule.code() }),
            ValidationError::Field { field, .. } => json!({ "field": field }),
            ValidationError::Body(_) => json!({ "field": "body" }),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("User not found")]
    NotFound,
    #[error("A user with this {0} already exists")]
    DuplicateResource(&'static str),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Database unavailable")]
    DatabaseUnavailable(#[source] sqlx::Error),
    #[error("Database error")]
    Database(#[source] sqlx::Error),
    #[error("Internal server error")]
    Unexpected(#[source] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound => "not_found",
            AppError::DuplicateResource(_) => "duplicate_resource",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::Validation(_) => "validation_error",
            AppError::DatabaseUnavailable(_) => "database_unavailable",
            AppError::Database(_) => "database_error",
            AppError::Unexpected(_) => "unexpected_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DuplicateResource(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unexpected(err: impl Into<anyhow::Error>) -> Self {
        AppError::Unexpected(err.into())
    }

    fn detail(&self) -> Option<Value> {
        match self {
            AppError::DuplicateResource(field) => Some(json!({ "field": field })),
            AppError::Validation(v) => Some(v.detail()),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => AppError::DatabaseUnavailable(e),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::DuplicateResource("email")
            }
            other => AppError::Database(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(ValidationError::Body(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Source chains stay in the logs; callers only see the public message.
        if status.is_server_error() {
            match &self {
                AppError::Unexpected(e) => error!(kind = self.kind(), error = ?e, "request failed"),
                AppError::DatabaseUnavailable(e) | AppError::Database(e) => {
                    error!(kind = self.kind(), error = %e, "request failed")
                }
                _ => error!(kind = self.kind(), "request failed"),
            }
        } else {
            warn!(kind = self.kind(), message = %self, "request rejected");
        }

        let mut body = json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(detail) = self.detail() {
            body["detail"] = detail;
        }

        let mut response = (status, Json(json!({ "success": false, "error": body }))).into_response();
        if matches!(self, AppError::InvalidToken) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
