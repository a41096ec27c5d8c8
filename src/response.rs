use axum::{extract::FromRequest, http::HeaderMap};
use serde::Serialize;

use crate::error::AppError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// `Json` whose rejections become [`AppError::Validation`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    pub request_id: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(headers: &HeaderMap, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
            request_id: request_id(headers),
        }
    }
}

pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
