//! Financial table simulation endpoints.
//!
//! The open table lives in the shared session. Every mutation recomputes the
//! table before the response is built, so responses always carry a complete
//! snapshot.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::Datelike;
use common::{BulkIncomeDetailRequest, SimulationSnapshot};
use compute::{AllocationCalculator, ComputeError, SubmissionOutcome};
use client::BackendSubmitter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{ApiError, api_error, storage_error};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::session::Session;

/// Request body for opening a simulation
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SimulationRequest {
    /// Enterprise to open; defaults to the enterprise of the first stored record
    pub enterprise_id: Option<i64>,
    /// Year written into submitted records; defaults to next year
    pub prediction_year: Option<i32>,
}

/// Request body for editing one cell of the table
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CellUpdateRequest {
    /// Category name
    #[validate(length(min = 1))]
    pub category: String,
    /// Month index, 0 for January to 11 for December
    #[validate(range(max = 11))]
    pub month: usize,
    /// New value; numbers and numeric text are accepted, anything else counts as zero
    #[schema(value_type = Object)]
    pub value: Value,
}

/// Request body for the simulated grand total
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TargetRequest {
    /// Target total; numbers and numeric text are accepted, anything else counts as zero
    #[schema(value_type = Object)]
    pub value: Value,
}

/// Request body for switching between the actual and simulated views
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ModeRequest {
    pub show_simulated: bool,
}

/// Query parameters for the payload preview
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PayloadQuery {
    /// Use simulated values; defaults to the displayed view
    pub simulated: Option<bool>,
}

/// Result of a successful submission
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    /// Number of income-detail records sent
    pub records: usize,
    pub prediction_year: i32,
}

/// Year submissions target unless one is given: the year after the current one.
pub fn default_prediction_year() -> i32 {
    chrono::Utc::now().year() + 1
}

fn no_simulation() -> ApiError {
    warn!("No simulation is open");
    api_error(
        StatusCode::NOT_FOUND,
        "No simulation is open",
        "NO_SIMULATION",
    )
}

fn compute_error(e: ComputeError) -> ApiError {
    warn!("Rejected table edit: {}", e);
    match e {
        ComputeError::UnknownCategory(_) => {
            api_error(StatusCode::NOT_FOUND, e.to_string(), "UNKNOWN_CATEGORY")
        }
        ComputeError::MonthOutOfRange(_) => {
            api_error(StatusCode::BAD_REQUEST, e.to_string(), "INVALID_MONTH")
        }
        ComputeError::Overflow(_) => api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            e.to_string(),
            "AMOUNT_OUT_OF_RANGE",
        ),
        ComputeError::Submission(_) => {
            api_error(StatusCode::BAD_GATEWAY, e.to_string(), "SUBMISSION_FAILED")
        }
    }
}

/// Open the financial table from the stored approved predictions
#[utoipa::path(
    post,
    path = "/api/v1/simulation",
    tag = "simulation",
    request_body = SimulationRequest,
    responses(
        (status = 201, description = "Simulation opened", body = ApiResponse<SimulationSnapshot>),
        (status = 404, description = "No approved predictions stored", body = ErrorResponse),
        (status = 422, description = "Stored amounts are out of range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn open_simulation(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SimulationSnapshot>>), ApiError> {
    trace!("Entering open_simulation function");

    let records = state.predictions.load_all().await.map_err(storage_error)?;
    let enterprise_id = request
        .enterprise_id
        .or_else(|| records.first().map(|r| r.enterprise_id))
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "No approved predictions stored",
                "NO_APPROVED_PREDICTIONS",
            )
        })?;

    let prediction_year = request
        .prediction_year
        .unwrap_or_else(default_prediction_year);
    let calculator =
        AllocationCalculator::from_approved(enterprise_id, &records).map_err(compute_error)?;
    debug!(
        "Opened table for enterprise {} with {} categories",
        enterprise_id,
        calculator.table().len()
    );

    let snapshot = calculator.snapshot();
    *state.session.lock().await = Some(Session {
        calculator,
        prediction_year,
    });

    info!("Simulation opened for enterprise {}", enterprise_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(snapshot, "Simulation opened successfully")),
    ))
}

/// Get the open financial table
#[utoipa::path(
    get,
    path = "/api/v1/simulation",
    tag = "simulation",
    responses(
        (status = 200, description = "Simulation retrieved successfully", body = ApiResponse<SimulationSnapshot>),
        (status = 404, description = "No simulation is open", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_simulation(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    let session = state.session.lock().await;
    let session = session.as_ref().ok_or_else(no_simulation)?;

    Ok(Json(ApiResponse::ok(
        session.calculator.snapshot(),
        "Simulation retrieved successfully",
    )))
}

/// Edit one monthly value
#[utoipa::path(
    put,
    path = "/api/v1/simulation/cells",
    tag = "simulation",
    request_body = CellUpdateRequest,
    responses(
        (status = 200, description = "Cell updated", body = ApiResponse<SimulationSnapshot>),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 404, description = "Unknown category or no simulation open", body = ErrorResponse),
        (status = 422, description = "Derived values out of range, table unchanged", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_cell(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CellUpdateRequest>>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    let mut session = state.session.lock().await;
    let session = session.as_mut().ok_or_else(no_simulation)?;

    session
        .calculator
        .set_monthly_value(&request.category, request.month, &request.value)
        .map_err(compute_error)?;

    Ok(Json(ApiResponse::ok(
        session.calculator.snapshot(),
        "Cell updated successfully",
    )))
}

/// Set the simulated grand total
#[utoipa::path(
    put,
    path = "/api/v1/simulation/target",
    tag = "simulation",
    request_body = TargetRequest,
    responses(
        (status = 200, description = "Target updated", body = ApiResponse<SimulationSnapshot>),
        (status = 404, description = "No simulation is open", body = ErrorResponse),
        (status = 422, description = "Derived values out of range, table unchanged", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_target(
    State(state): State<AppState>,
    Json(request): Json<TargetRequest>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    let mut session = state.session.lock().await;
    let session = session.as_mut().ok_or_else(no_simulation)?;

    session
        .calculator
        .set_simulation_target(&request.value)
        .map_err(compute_error)?;

    Ok(Json(ApiResponse::ok(
        session.calculator.snapshot(),
        "Simulation target updated successfully",
    )))
}

/// Switch between the actual and the simulated view
#[utoipa::path(
    put,
    path = "/api/v1/simulation/mode",
    tag = "simulation",
    request_body = ModeRequest,
    responses(
        (status = 200, description = "View switched", body = ApiResponse<SimulationSnapshot>),
        (status = 404, description = "No simulation is open", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_mode(
    State(state): State<AppState>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<ApiResponse<SimulationSnapshot>>, ApiError> {
    let mut session = state.session.lock().await;
    let session = session.as_mut().ok_or_else(no_simulation)?;

    session.calculator.set_show_simulated(request.show_simulated);

    Ok(Json(ApiResponse::ok(
        session.calculator.snapshot(),
        "View switched successfully",
    )))
}

/// Preview the bulk submission payload
#[utoipa::path(
    get,
    path = "/api/v1/simulation/payload",
    tag = "simulation",
    params(PayloadQuery),
    responses(
        (status = 200, description = "Payload built", body = ApiResponse<BulkIncomeDetailRequest>),
        (status = 404, description = "No simulation is open", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn preview_payload(
    Query(query): Query<PayloadQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BulkIncomeDetailRequest>>, ApiError> {
    let session = state.session.lock().await;
    let session = session.as_ref().ok_or_else(no_simulation)?;

    let calculator = &session.calculator;
    let payload = calculator.build_submission_payload(
        calculator.enterprise_id(),
        session.prediction_year,
        query.simulated.unwrap_or(calculator.show_simulated()),
    );

    Ok(Json(ApiResponse::ok(payload, "Payload built successfully")))
}

/// Submit the displayed view to the backend
///
/// The table is left as it is whether or not the backend accepts it.
#[utoipa::path(
    post,
    path = "/api/v1/simulation/approve",
    tag = "simulation",
    responses(
        (status = 200, description = "Simulation submitted", body = ApiResponse<SubmissionResponse>),
        (status = 404, description = "No simulation is open", body = ErrorResponse),
        (status = 502, description = "Backend rejected the submission", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn approve_simulation(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SubmissionResponse>>, ApiError> {
    // Submit from a copy so the session is not locked during backend I/O
    let session = state
        .session
        .lock()
        .await
        .clone()
        .ok_or_else(no_simulation)?;

    let submitter = BackendSubmitter(state.backend.as_ref());
    match session
        .calculator
        .approve(&submitter, session.prediction_year)
        .await
    {
        SubmissionOutcome::Submitted { records } => {
            info!("Simulation submitted with {} records", records);
            let data = SubmissionResponse {
                records,
                prediction_year: session.prediction_year,
            };
            Ok(Json(ApiResponse::ok(data, "Simulation submitted successfully")))
        }
        SubmissionOutcome::Failed { message } => {
            error!("Simulation submission failed: {}", message);
            Err(api_error(StatusCode::BAD_GATEWAY, message, "SUBMISSION_FAILED"))
        }
    }
}
