use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::{error::AppError, state::AppState, users::dto::UserResponse};

/// Authenticated caller: a valid bearer token whose subject still exists.
pub struct CurrentUser(pub UserResponse);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::InvalidToken)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::InvalidToken)?;

        let claims = state.tokens.verify(token)?;

        match state.users.get_by_id(&claims.sub.to_string()).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(AppError::NotFound) => {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                Err(AppError::InvalidToken)
            }
            Err(e) => Err(e),
        }
    }
}
