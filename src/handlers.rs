use axum::{http::StatusCode, response::Json};
use model::StoreError;
use tracing::error;

use crate::schemas::ErrorResponse;

pub mod approved_predictions;
pub mod backlog;
pub mod health;
pub mod simulation;

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>, code: &str) -> ApiError {
    (status, Json(ErrorResponse::new(message, code)))
}

pub(crate) fn storage_error(e: StoreError) -> ApiError {
    error!("Approved prediction storage failed: {}", e);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to access approved predictions",
        "STORAGE_ERROR",
    )
}
