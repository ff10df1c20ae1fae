use crate::handlers::{
    approved_predictions::{
        approve_prediction, clear_approved_predictions, list_approved_predictions,
        select_enterprise,
    },
    backlog::get_backlog,
    health::health_check,
    simulation::{
        approve_simulation, get_simulation, open_simulation, preview_payload, update_cell,
        update_mode, update_target,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Approved prediction storage
        .route(
            "/api/v1/approved-predictions",
            get(list_approved_predictions)
                .post(approve_prediction)
                .delete(clear_approved_predictions),
        )
        .route(
            "/api/v1/approved-predictions/enterprise/:enterprise_id",
            put(select_enterprise),
        )
        // Financial table simulation
        .route("/api/v1/simulation", post(open_simulation).get(get_simulation))
        .route("/api/v1/simulation/cells", put(update_cell))
        .route("/api/v1/simulation/target", put(update_target))
        .route("/api/v1/simulation/mode", put(update_mode))
        .route("/api/v1/simulation/payload", get(preview_payload))
        .route("/api/v1/simulation/approve", post(approve_simulation))
        // Backlog
        .route("/api/v1/enterprises/:enterprise_id/backlog", get(get_backlog))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
