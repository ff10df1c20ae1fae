use anyhow::{Result, bail};
use client::HttpBackend;
use compute::{AllocationCalculator, SubmissionOutcome};
use migration::{Migrator, MigratorTrait};
use model::{ApprovedPredictionStore, DatabaseStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cli::BackendArgs;
use crate::config::{backend_config, connect};
use crate::handlers::simulation::default_prediction_year;

/// What to simulate and whether to submit the result.
#[derive(Debug, Clone, Default)]
pub struct SimulateOptions {
    pub enterprise_id: Option<i64>,
    pub target: Option<String>,
    pub year: Option<i32>,
    pub simulated: bool,
    pub submit: bool,
}

/// Builds the financial table from the stored approved predictions, prints its
/// snapshot as JSON, and submits the payload when asked to.
pub async fn simulate(
    database_url: &str,
    backend: &BackendArgs,
    options: SimulateOptions,
) -> Result<()> {
    let db = connect(database_url).await?;
    Migrator::up(&db, None).await?;
    let store = ApprovedPredictionStore::new(Arc::new(DatabaseStore::new(db)));

    let records = store.load_all().await?;
    let enterprise_id = match options.enterprise_id.or_else(|| records.first().map(|r| r.enterprise_id)) {
        Some(id) => id,
        None => bail!("No approved predictions stored"),
    };
    debug!("Simulating enterprise {} from {} records", enterprise_id, records.len());

    let mut calculator = AllocationCalculator::from_approved(enterprise_id, &records)?;
    if calculator.table().is_empty() {
        warn!("Enterprise {} has no approved predictions", enterprise_id);
    }
    if let Some(target) = options.target.as_deref() {
        calculator.set_simulation_target(target)?;
    }
    calculator.set_show_simulated(options.simulated);

    println!("{}", serde_json::to_string_pretty(&calculator.snapshot())?);

    if options.submit {
        let year = options.year.unwrap_or_else(default_prediction_year);
        let backend = HttpBackend::new(backend_config(backend))?;

        match calculator.approve(&backend, year).await {
            SubmissionOutcome::Submitted { records } => {
                info!("Submitted {} income details to {}", records, backend.base_url());
            }
            SubmissionOutcome::Failed { message } => bail!("Submission failed: {}", message),
        }
    }

    Ok(())
}
