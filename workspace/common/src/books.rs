//! Order book and opportunity book snapshots served by the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::lenient;
use crate::prediction::PredictionYear;

/// Latest order book or opportunity book of an enterprise.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BookSnapshot {
    pub enterprise_id: i64,
    #[serde(default)]
    pub enterprise_name: Option<String>,
    /// Book total, rounded to two decimals by the backend
    #[serde(deserialize_with = "lenient::decimal_or_zero")]
    pub latest_total: Decimal,
    /// Book year; opportunity books may carry it as text
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub year: Option<PredictionYear>,
    #[serde(default)]
    pub active: Option<bool>,
    /// Share of opportunities expected to close (opportunity books only)
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub pourcentage_closing: Option<Decimal>,
}

/// Backlog figures shown next to the financial table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BacklogSummary {
    pub enterprise_id: i64,
    /// Latest order book total
    pub order_book: Decimal,
    /// Closing rate applied to the opportunity book, as a fraction
    pub closing_rate: Decimal,
    /// Latest opportunity book total
    pub opportunity_total: Decimal,
    /// Opportunity total weighted by the closing rate
    pub weighted_opportunities: Decimal,
    /// Order book plus weighted opportunities
    pub total: Decimal,
}
