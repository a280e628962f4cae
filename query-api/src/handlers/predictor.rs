//! Predictor handlers: greeting and disease catalog

use axum::{http::Uri, Json};
use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

/// Liveness greeting
pub async fn hit_api() -> Json<MessageResponse> {
    Json(MessageResponse { message: "Hello" })
}

/// The 13 diseases the predictor can emit, in catalog order
pub async fn diseases() -> Json<Vec<&'static str>> {
    Json(airaware_predictor::catalog())
}

pub async fn not_found(uri: Uri) -> AppResult<()> {
    Err(AppError::NotFound(format!("No route for {}", uri.path())))
}
