//! Approved predictions kept in a key-value store.
//!
//! The whole record set is stored as a single JSON array under
//! [`APPROVED_PREDICTIONS_KEY`]. At most one record exists per approval slot
//! (enterprise, targeted revenue, prediction type, revenue identifier).
//!
//! Every write is a read-modify-write of that array, so writes through one
//! [`ApprovedPredictionStore`] and its clones are serialized by a shared lock.

use std::sync::Arc;

use common::ApprovedPrediction;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace};

use crate::error::Result;
use crate::store::KeyValueStore;

/// Key under which the record set is stored.
pub const APPROVED_PREDICTIONS_KEY: &str = "approvedPredictions";

/// What [`ApprovedPredictionStore::approve`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Inserted,
    Updated,
}

#[derive(Clone)]
pub struct ApprovedPredictionStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl ApprovedPredictionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All stored records, in approval order.
    ///
    /// A missing or blank entry is an empty set.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<ApprovedPrediction>> {
        let raw = self.store.load(APPROVED_PREDICTIONS_KEY).await?;
        let records = match raw {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)?,
            _ => Vec::new(),
        };
        trace!("Loaded {} approved predictions", records.len());
        Ok(records)
    }

    /// Adds `prediction`, replacing the record of the same slot if there is one.
    #[instrument(skip(self, prediction), fields(enterprise_id = prediction.enterprise_id, revenue = %prediction.targeted_revenue))]
    pub async fn approve(&self, prediction: ApprovedPrediction) -> Result<ApprovalOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_all().await?;

        let outcome = match records.iter_mut().find(|r| r.same_slot(&prediction)) {
            Some(existing) => {
                *existing = prediction;
                ApprovalOutcome::Updated
            }
            None => {
                records.push(prediction);
                ApprovalOutcome::Inserted
            }
        };

        self.save_all(&records).await?;
        info!("Approved prediction {:?}, {} records stored", outcome, records.len());
        Ok(outcome)
    }

    /// Removes every record.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.remove_all().await
    }

    /// Makes `enterprise_id` the working enterprise.
    ///
    /// Records of a different enterprise are dropped. Returns whether the
    /// store was cleared.
    #[instrument(skip(self))]
    pub async fn select_enterprise(&self, enterprise_id: i64) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let records = self.load_all().await?;
        if records.iter().all(|r| r.enterprise_id == enterprise_id) {
            debug!("Store already holds enterprise {}", enterprise_id);
            return Ok(false);
        }

        self.remove_all().await?;
        Ok(true)
    }

    /// Enterprise of the first stored record.
    pub async fn first_enterprise_id(&self) -> Result<Option<i64>> {
        Ok(self.load_all().await?.first().map(|r| r.enterprise_id))
    }

    async fn remove_all(&self) -> Result<()> {
        self.store.remove(APPROVED_PREDICTIONS_KEY).await?;
        info!("Cleared approved predictions");
        Ok(())
    }

    async fn save_all(&self, records: &[ApprovedPrediction]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.store.save(APPROVED_PREDICTIONS_KEY, raw).await
    }
}
