//! Financial table snapshot served to the presentation layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of a rendered table row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Monthly shares of a category, in percent
    Percentage,
    /// Monthly values of a category in the selected view
    Category,
    /// Actual totals per month across categories
    TotalActual,
    /// Simulated totals per month across categories
    TotalSimulated,
}

/// One rendered row of the financial table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TableRow {
    pub key: String,
    pub kind: RowKind,
    pub label: String,
    pub revenue_id: Option<String>,
    /// Twelve monthly cells
    pub months: Vec<Decimal>,
    pub total: Option<Decimal>,
    pub simulated_total: Option<Decimal>,
    /// Share of the grand total, formatted as a percentage
    pub share: Option<String>,
}

/// Derived values of a single category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategorySummary {
    pub name: String,
    pub revenue_id: String,
    pub actual: Vec<Decimal>,
    pub total: Decimal,
    /// Fraction of the category total contributed by each month
    pub monthly_shares: Vec<Decimal>,
    /// Fraction of the grand total contributed by this category
    pub share_of_grand_total: Decimal,
    pub simulated_total: Decimal,
    pub simulated: Vec<Decimal>,
}

/// Full state of the financial table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SimulationSnapshot {
    pub enterprise_id: i64,
    pub show_simulated: bool,
    pub month_labels: Vec<String>,
    pub simulated_grand_total: Decimal,
    pub grand_total: Decimal,
    pub total_actual_by_month: Vec<Decimal>,
    pub total_simulated_by_month: Vec<Decimal>,
    pub categories: Vec<CategorySummary>,
    pub rows: Vec<TableRow>,
}
