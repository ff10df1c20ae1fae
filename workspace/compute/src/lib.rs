//! Revenue allocation engine.
//!
//! Everything in this crate is synchronous and free of I/O except the
//! [`SimulationSubmitter`] seam, which the server and the CLI implement on top
//! of the backend client.

pub mod allocation;
pub mod amount;
pub mod backlog;
pub mod calculator;
pub mod error;
pub mod payload;
pub mod submission;
pub mod table;
mod view;

pub use allocation::{Allocation, CategoryAllocation, DERIVED_LIMIT, compute_all};
pub use amount::{AmountInput, MAX_AMOUNT, bounded, parse_amount, round_half_up};
pub use backlog::{DEFAULT_CLOSING_RATE, summarize_backlog};
pub use calculator::AllocationCalculator;
pub use error::{ComputeError, Result};
pub use payload::build_submission_payload;
pub use submission::{SimulationSubmitter, SubmissionOutcome};
pub use table::{MonthlyValues, RevenueCategory, RevenueTable};
