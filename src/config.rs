use anyhow::Result;
use client::{BackendConfig, ForecastBackend, HttpBackend};
use model::{ApprovedPredictionStore, DatabaseStore};
use moka::future::Cache;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::cli::BackendArgs;
use crate::schemas::AppState;
use crate::session::SharedSession;

/// Runtime configuration of the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub backend: BackendConfig,
}

impl AppConfig {
    pub fn new(database_url: String, bind_address: String, backend: &BackendArgs) -> Self {
        Self {
            database_url,
            bind_address,
            backend: backend_config(backend),
        }
    }
}

/// Backend client settings from the command line or environment.
pub fn backend_config(args: &BackendArgs) -> BackendConfig {
    BackendConfig {
        base_url: args.backend_url.clone(),
        timeout: Duration::from_secs(args.backend_timeout_secs),
    }
}

/// Connect to the database, logging the URL.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database: {}", database_url);
    Ok(Database::connect(database_url).await?)
}

/// Build the shared state around an open connection and a backend.
pub fn build_app_state(db: DatabaseConnection, backend: Arc<dyn ForecastBackend>) -> AppState {
    let predictions = ApprovedPredictionStore::new(Arc::new(DatabaseStore::new(db.clone())));

    // Backlog summaries
    let backlog_cache = Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes
        .build();

    AppState {
        db,
        predictions,
        backend,
        session: SharedSession::default(),
        backlog_cache,
    }
}

/// Initialize application state from configuration
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    let db = connect(&config.database_url).await?;

    debug!("Backend API at {}", config.backend.base_url);
    let backend = HttpBackend::new(config.backend.clone())?;

    Ok(build_app_state(db, Arc::new(backend)))
}
