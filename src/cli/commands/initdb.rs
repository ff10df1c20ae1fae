use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use model::{ApprovedPredictionStore, DatabaseStore};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::connect;

/// Creates the key-value storage and reports what it already holds.
pub async fn init_database(database_url: &str) -> Result<()> {
    debug!("Preparing key-value storage at {}", database_url);
    let db = connect(database_url)
        .await
        .with_context(|| format!("Cannot open storage at {}", database_url))?;

    let pending = Migrator::get_pending_migrations(&db).await?.len();
    Migrator::up(&db, None)
        .await
        .context("Failed to create the key-value table")?;
    info!("Applied {} pending migrations", pending);

    let store = ApprovedPredictionStore::new(Arc::new(DatabaseStore::new(db)));
    let records = store.load_all().await?;
    match records.first() {
        Some(first) => info!(
            "Storage holds {} approved predictions for enterprise {}",
            records.len(),
            first.enterprise_id
        ),
        None => info!("Storage is ready and holds no approved predictions"),
    }
    Ok(())
}
