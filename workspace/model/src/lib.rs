//! Local persistence for the simulator.
//!
//! Approved predictions live in a key-value store so that they survive
//! restarts, the way the dashboard keeps them in browser storage.

pub mod approved;
pub mod entities;
pub mod error;
pub mod store;

pub use approved::{APPROVED_PREDICTIONS_KEY, ApprovalOutcome, ApprovedPredictionStore};
pub use error::{Result, StoreError};
pub use store::{DatabaseStore, KeyValueStore, MemoryStore};
