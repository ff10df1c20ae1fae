//! Seam between the calculator and whatever persists a bulk submission.

use async_trait::async_trait;
use common::BulkIncomeDetailRequest;

use crate::error::Result;

/// Accepts a bulk income-detail payload on behalf of the calculator.
///
/// Implementations perform the actual I/O. They report failures through
/// [`crate::error::ComputeError::Submission`] and never retry.
#[async_trait]
pub trait SimulationSubmitter: Send + Sync {
    async fn submit(&self, request: &BulkIncomeDetailRequest) -> Result<()>;
}

/// Result of handing a payload to a [`SimulationSubmitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Submitted { records: usize },
    Failed { message: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Submitted { .. })
    }
}
