use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::ApprovedPrediction;
use model::ApprovalOutcome;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

use super::{ApiError, storage_error};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Result of approving a prediction
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApprovalResponse {
    /// Whether the record was new to its slot
    pub inserted: bool,
    /// Number of records stored afterwards
    pub records: usize,
}

/// Result of selecting an enterprise
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnterpriseSelectionResponse {
    pub enterprise_id: i64,
    /// Whether records of another enterprise were dropped
    pub cleared: bool,
}

/// List approved predictions
#[utoipa::path(
    get,
    path = "/api/v1/approved-predictions",
    tag = "approved-predictions",
    responses(
        (status = 200, description = "Approved predictions retrieved successfully", body = ApiResponse<Vec<ApprovedPrediction>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_approved_predictions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ApprovedPrediction>>>, ApiError> {
    trace!("Entering list_approved_predictions function");

    let records = state.predictions.load_all().await.map_err(storage_error)?;
    debug!("Retrieved {} approved predictions", records.len());

    Ok(Json(ApiResponse::ok(
        records,
        "Approved predictions retrieved successfully",
    )))
}

/// Approve a prediction
///
/// A record for the same enterprise, targeted revenue, prediction type and
/// revenue identifier is replaced.
#[utoipa::path(
    post,
    path = "/api/v1/approved-predictions",
    tag = "approved-predictions",
    request_body = ApprovedPrediction,
    responses(
        (status = 201, description = "Prediction approved", body = ApiResponse<ApprovalResponse>),
        (status = 200, description = "Prediction replaced", body = ApiResponse<ApprovalResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, prediction), fields(enterprise_id = prediction.enterprise_id))]
pub async fn approve_prediction(
    State(state): State<AppState>,
    Json(prediction): Json<ApprovedPrediction>,
) -> Result<(StatusCode, Json<ApiResponse<ApprovalResponse>>), ApiError> {
    trace!("Entering approve_prediction function");
    debug!(
        "Approving {} prediction for revenue '{}'",
        prediction.prediction_type, prediction.targeted_revenue
    );

    let outcome = state
        .predictions
        .approve(prediction)
        .await
        .map_err(storage_error)?;
    let records = state
        .predictions
        .load_all()
        .await
        .map_err(storage_error)?
        .len();

    let (status, message) = match outcome {
        ApprovalOutcome::Inserted => (StatusCode::CREATED, "Prediction approved successfully"),
        ApprovalOutcome::Updated => (StatusCode::OK, "Approved prediction replaced"),
    };
    info!("{} ({} records stored)", message, records);

    let data = ApprovalResponse {
        inserted: outcome == ApprovalOutcome::Inserted,
        records,
    };
    Ok((status, Json(ApiResponse::ok(data, message))))
}

/// Remove every approved prediction
#[utoipa::path(
    delete,
    path = "/api/v1/approved-predictions",
    tag = "approved-predictions",
    responses(
        (status = 204, description = "Approved predictions cleared"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn clear_approved_predictions(
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.predictions.clear().await.map_err(storage_error)?;
    info!("Approved predictions cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// Select the working enterprise
///
/// Stored records of any other enterprise are dropped together with the open
/// simulation.
#[utoipa::path(
    put,
    path = "/api/v1/approved-predictions/enterprise/{enterprise_id}",
    tag = "approved-predictions",
    params(
        ("enterprise_id" = i64, Path, description = "Enterprise ID"),
    ),
    responses(
        (status = 200, description = "Enterprise selected", body = ApiResponse<EnterpriseSelectionResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn select_enterprise(
    Path(enterprise_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<EnterpriseSelectionResponse>>, ApiError> {
    let cleared = state
        .predictions
        .select_enterprise(enterprise_id)
        .await
        .map_err(storage_error)?;

    if cleared {
        let mut session = state.session.lock().await;
        if session
            .as_ref()
            .is_some_and(|s| s.calculator.enterprise_id() != enterprise_id)
        {
            debug!("Closing simulation of another enterprise");
            *session = None;
        }
        info!("Switched to enterprise {}, previous records dropped", enterprise_id);
    }

    let data = EnterpriseSelectionResponse {
        enterprise_id,
        cleared,
    };
    Ok(Json(ApiResponse::ok(data, "Enterprise selected")))
}
