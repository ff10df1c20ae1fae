//! The single simulation session served by the API.

use compute::AllocationCalculator;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Calculator state for the enterprise currently open in the financial table.
#[derive(Debug, Clone)]
pub struct Session {
    pub calculator: AllocationCalculator,
    /// Year written into submitted income details
    pub prediction_year: i32,
}

/// Requests are served one at a time against the session, so every request
/// observes a fully recomputed table.
pub type SharedSession = Arc<Mutex<Option<Session>>>;
