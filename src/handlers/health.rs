use axum::{extract::State, response::Json};
use tracing::{instrument, warn};

use crate::schemas::{AppState, HealthResponse};

/// Report storage reachability and whether a financial table is open
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service status; `degraded` when storage is unreachable", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage_ok = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Key-value storage unreachable: {}", e);
            false
        }
    };
    let simulation_open = state.session.lock().await.is_some();

    Json(HealthResponse {
        status: if storage_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if storage_ok { "connected" } else { "disconnected" }.to_string(),
        simulation_open,
    })
}
