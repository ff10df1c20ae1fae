//! Stateful front of the allocation calculator.
//!
//! [`AllocationCalculator`] owns the revenue table of one enterprise together
//! with its derived [`Allocation`]. Every mutation recomputes the allocation
//! before returning and commits the table and the allocation together, so a
//! failed mutation leaves both as they were.

use common::{ApprovedPrediction, BulkIncomeDetailRequest, SimulationSnapshot};
use tracing::{debug, error, info, instrument, trace};

use crate::allocation::{Allocation, compute_all};
use crate::amount::AmountInput;
use crate::error::Result;
use crate::payload::build_submission_payload;
use crate::submission::{SimulationSubmitter, SubmissionOutcome};
use crate::table::RevenueTable;

#[derive(Debug, Clone)]
pub struct AllocationCalculator {
    enterprise_id: i64,
    table: RevenueTable,
    allocation: Allocation,
    show_simulated: bool,
}

impl AllocationCalculator {
    /// Creates a calculator over `table`, starting in the actual view.
    pub fn new(enterprise_id: i64, table: RevenueTable) -> Result<Self> {
        let allocation = compute_all(&table)?;
        Ok(Self {
            enterprise_id,
            table,
            allocation,
            show_simulated: false,
        })
    }

    /// Creates a calculator from the approved predictions of `enterprise_id`.
    ///
    /// Records of other enterprises are ignored.
    #[instrument(skip(predictions), fields(records = predictions.len()))]
    pub fn from_approved(enterprise_id: i64, predictions: &[ApprovedPrediction]) -> Result<Self> {
        let own: Vec<ApprovedPrediction> = predictions
            .iter()
            .filter(|p| p.enterprise_id == enterprise_id)
            .cloned()
            .collect();
        if own.len() != predictions.len() {
            debug!(
                "Ignored {} approved predictions of other enterprises",
                predictions.len() - own.len()
            );
        }
        Self::new(enterprise_id, RevenueTable::from_approved(&own))
    }

    pub fn enterprise_id(&self) -> i64 {
        self.enterprise_id
    }

    pub fn table(&self) -> &RevenueTable {
        &self.table
    }

    /// Derived values as of the last mutation.
    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    pub fn show_simulated(&self) -> bool {
        self.show_simulated
    }

    /// Switches between the actual and the simulated view.
    ///
    /// Only the rows and the default submission change; the actual values are
    /// never touched.
    pub fn set_show_simulated(&mut self, show_simulated: bool) {
        trace!("Switching simulated view to {}", show_simulated);
        self.show_simulated = show_simulated;
    }

    /// Overwrites one month of one category and recomputes everything.
    ///
    /// Unparseable input is stored as zero.
    #[instrument(skip(self, value))]
    pub fn set_monthly_value(
        &mut self,
        category: &str,
        month: usize,
        value: impl Into<AmountInput>,
    ) -> Result<()> {
        let amount = value.into().coerce();
        debug!("Setting {}[{}] to {}", category, month, amount);

        let mut table = self.table.clone();
        table.set_month(category, month, amount)?;
        let allocation = compute_all(&table)?;

        self.table = table;
        self.allocation = allocation;
        Ok(())
    }

    /// Sets the simulated grand total and recomputes the simulated side only.
    ///
    /// Unparseable input sets the target to zero.
    #[instrument(skip(self, value))]
    pub fn set_simulation_target(&mut self, value: impl Into<AmountInput>) -> Result<()> {
        let target = value.into().coerce();
        debug!("Setting simulated grand total to {}", target);

        let allocation = self.allocation.with_target(target)?;
        self.table.set_simulated_grand_total(target);
        self.allocation = allocation;
        Ok(())
    }

    /// Recomputes the full derived set from the current table.
    ///
    /// Pure: the stored allocation is left as it is.
    pub fn compute_all(&self) -> Result<Allocation> {
        compute_all(&self.table)
    }

    /// Builds the bulk submission payload from the actual or simulated view.
    pub fn build_submission_payload(
        &self,
        enterprise_id: i64,
        prediction_year: i32,
        use_simulated_values: bool,
    ) -> BulkIncomeDetailRequest {
        build_submission_payload(
            &self.allocation,
            enterprise_id,
            prediction_year,
            use_simulated_values,
        )
    }

    /// Payload for the view currently displayed.
    pub fn current_payload(&self, prediction_year: i32) -> BulkIncomeDetailRequest {
        self.build_submission_payload(self.enterprise_id, prediction_year, self.show_simulated)
    }

    /// Hands the payload of the displayed view to `submitter`.
    ///
    /// The calculator's state is the same afterwards whether or not the
    /// submission succeeded.
    #[instrument(skip(self, submitter), fields(enterprise_id = self.enterprise_id))]
    pub async fn approve(
        &self,
        submitter: &dyn SimulationSubmitter,
        prediction_year: i32,
    ) -> SubmissionOutcome {
        let payload = self.current_payload(prediction_year);
        let records = payload.income_details.len();

        match submitter.submit(&payload).await {
            Ok(()) => {
                info!("Submitted {} income details for {}", records, prediction_year);
                SubmissionOutcome::Submitted { records }
            }
            Err(e) => {
                error!("Failed to submit simulation: {}", e);
                SubmissionOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Transport snapshot of the table in the displayed view.
    pub fn snapshot(&self) -> SimulationSnapshot {
        self.allocation.to_snapshot(self.enterprise_id, self.show_simulated)
    }
}
