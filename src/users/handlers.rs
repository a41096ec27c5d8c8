use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::dto::{LoginRequest, RegisterRequest, TokenResponse, UpdateUserRequest, UserResponse};
use crate::{
    auth::extractors::CurrentUser,
    error::AppError,
    response::{ApiResponse, AppJson},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/me", get(get_me).delete(delete_me))
        .route("/users/me/update", put(update_me))
}

#[instrument(skip(state, headers, payload))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let payload = payload.validate()?;
    let user = state.users.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(&headers, Some(user), "User created successfully")),
    ))
}

#[instrument(skip(state, headers, payload))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    let payload = payload.validate()?;
    let token = state.users.login(payload).await?;
    Ok(Json(ApiResponse::ok(&headers, Some(token), "User Authenticated")))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user)
}

#[instrument(skip_all)]
pub async fn update_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let payload = payload.validate()?;
    let updated = state
        .users
        .update_profile(&user.id.to_string(), payload)
        .await?;
    Ok(Json(ApiResponse::ok(&headers, Some(updated), "Update successful")))
}

#[instrument(skip_all)]
pub async fn delete_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.users.delete(&user.id.to_string()).await?;
    Ok(Json(ApiResponse::ok(&headers, None, "User deleted")))
}
