use client::ForecastBackend;
use common::{
    ApprovedPrediction, BacklogSummary, BulkIncomeDetailRequest, CategorySummary, IncomeDetail,
    MonthRow, RowKind, SimulationSnapshot, TableRow,
};
use model::ApprovedPredictionStore;
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::handlers::approved_predictions::{ApprovalResponse, EnterpriseSelectionResponse};
use crate::handlers::simulation::{
    CellUpdateRequest, ModeRequest, SimulationRequest, SubmissionResponse, TargetRequest,
};
use crate::session::SharedSession;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Approved predictions kept in the database
    pub predictions: ApprovedPredictionStore,
    /// Forecasting backend
    pub backend: Arc<dyn ForecastBackend>,
    /// Financial table currently open
    pub session: SharedSession,
    /// Backlog summaries per enterprise
    pub backlog_cache: Cache<i64, BacklogSummary>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
    /// Whether a financial table is open in the session
    pub simulation_open: bool,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::approved_predictions::list_approved_predictions,
        crate::handlers::approved_predictions::approve_prediction,
        crate::handlers::approved_predictions::clear_approved_predictions,
        crate::handlers::approved_predictions::select_enterprise,
        crate::handlers::simulation::open_simulation,
        crate::handlers::simulation::get_simulation,
        crate::handlers::simulation::update_cell,
        crate::handlers::simulation::update_target,
        crate::handlers::simulation::update_mode,
        crate::handlers::simulation::preview_payload,
        crate::handlers::simulation::approve_simulation,
        crate::handlers::backlog::get_backlog,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ApprovedPrediction,
            MonthRow,
            ApprovalResponse,
            EnterpriseSelectionResponse,
            SimulationRequest,
            CellUpdateRequest,
            TargetRequest,
            ModeRequest,
            SubmissionResponse,
            SimulationSnapshot,
            CategorySummary,
            TableRow,
            RowKind,
            BulkIncomeDetailRequest,
            IncomeDetail,
            BacklogSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "approved-predictions", description = "Approved prediction storage"),
        (name = "simulation", description = "Revenue allocation and simulation"),
        (name = "backlog", description = "Order and opportunity backlog"),
    ),
    info(
        title = "FinSim API",
        description = "Revenue simulation API - spreads a target revenue across revenue lines and months",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
