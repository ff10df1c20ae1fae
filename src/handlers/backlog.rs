use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use client::ClientError;
use common::BacklogSummary;
use compute::summarize_backlog;
use tracing::{debug, error, instrument, trace};

use super::{ApiError, api_error};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

fn backend_error(e: ClientError) -> ApiError {
    error!("Failed to fetch books from backend: {}", e);
    api_error(
        StatusCode::BAD_GATEWAY,
        format!("Failed to fetch books: {}", e),
        "BACKEND_ERROR",
    )
}

/// Get the backlog summary of an enterprise
///
/// Combines the latest order book with the latest opportunity book weighted
/// by its closing rate. Results are cached for five minutes.
#[utoipa::path(
    get,
    path = "/api/v1/enterprises/{enterprise_id}/backlog",
    tag = "backlog",
    params(
        ("enterprise_id" = i64, Path, description = "Enterprise ID"),
    ),
    responses(
        (status = 200, description = "Backlog retrieved successfully", body = ApiResponse<BacklogSummary>),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_backlog(
    Path(enterprise_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BacklogSummary>>, ApiError> {
    trace!("Entering get_backlog function for enterprise {}", enterprise_id);

    // Check cache first
    if let Some(summary) = state.backlog_cache.get(&enterprise_id).await {
        debug!("Backlog of enterprise {} served from cache", enterprise_id);
        return Ok(Json(ApiResponse::ok(
            summary,
            "Backlog retrieved from cache",
        )));
    }

    let order_book = state
        .backend
        .latest_order_book(enterprise_id)
        .await
        .map_err(backend_error)?;
    let opportunity_book = state
        .backend
        .latest_opportunity_book(enterprise_id)
        .await
        .map_err(backend_error)?;

    let summary = summarize_backlog(enterprise_id, order_book.as_ref(), opportunity_book.as_ref());

    // Cache the result
    state
        .backlog_cache
        .insert(enterprise_id, summary.clone())
        .await;

    Ok(Json(ApiResponse::ok(
        summary,
        "Backlog retrieved successfully",
    )))
}
