//! Renderable rows of the financial table.

use common::{CategorySummary, MONTH_LABELS, RowKind, SimulationSnapshot, TableRow};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::allocation::Allocation;

impl Allocation {
    /// Rows of the financial table for the actual or the simulated view.
    ///
    /// Each category contributes a percentage row followed by its value row.
    /// The "Total revenus" and "Total simuler" rows close the table. The
    /// percentage rows are the same in both views.
    pub fn rows(&self, show_simulated: bool) -> Vec<TableRow> {
        let mut rows = Vec::with_capacity(self.categories.len() * 2 + 2);

        for category in &self.categories {
            rows.push(TableRow {
                key: format!("{}-percentage", category.name),
                kind: RowKind::Percentage,
                label: "%".to_string(),
                revenue_id: Some(category.revenue_id.clone()),
                months: category
                    .monthly_shares
                    .iter()
                    .map(|share| *share * Decimal::ONE_HUNDRED)
                    .collect(),
                total: Some(category.percentage_row_total()),
                simulated_total: None,
                share: None,
            });

            let values = category.values(show_simulated);
            rows.push(TableRow {
                key: category.name.clone(),
                kind: RowKind::Category,
                label: category.name.clone(),
                revenue_id: Some(category.revenue_id.clone()),
                months: values.to_vec(),
                total: Some(values.iter().copied().sum()),
                simulated_total: Some(category.simulated_total),
                share: Some(format_percent(category.share_of_grand_total)),
            });
        }

        rows.push(TableRow {
            key: "total-revenus".to_string(),
            kind: RowKind::TotalActual,
            label: "Total revenus".to_string(),
            revenue_id: None,
            months: self.total_actual_by_month.to_vec(),
            total: Some(self.grand_total),
            simulated_total: Some(self.simulated_grand_total),
            share: Some("100%".to_string()),
        });

        rows.push(TableRow {
            key: "total-simuler".to_string(),
            kind: RowKind::TotalSimulated,
            label: "Total simuler".to_string(),
            revenue_id: None,
            months: self.total_simulated_by_month.to_vec(),
            total: Some(self.simulated_monthly_sum()),
            simulated_total: None,
            share: None,
        });

        rows
    }

    /// Full transport snapshot of the table.
    pub fn to_snapshot(&self, enterprise_id: i64, show_simulated: bool) -> SimulationSnapshot {
        SimulationSnapshot {
            enterprise_id,
            show_simulated,
            month_labels: MONTH_LABELS.iter().map(|label| label.to_string()).collect(),
            simulated_grand_total: self.simulated_grand_total,
            grand_total: self.grand_total,
            total_actual_by_month: self.total_actual_by_month.to_vec(),
            total_simulated_by_month: self.total_simulated_by_month.to_vec(),
            categories: self
                .categories
                .iter()
                .map(|category| CategorySummary {
                    name: category.name.clone(),
                    revenue_id: category.revenue_id.clone(),
                    actual: category.actual.to_vec(),
                    total: category.total,
                    monthly_shares: category.monthly_shares.to_vec(),
                    share_of_grand_total: category.share_of_grand_total,
                    simulated_total: category.simulated_total,
                    simulated: category.simulated.to_vec(),
                })
                .collect(),
            rows: self.rows(show_simulated),
        }
    }
}

/// Formats a fraction as a percentage with two decimals (`0.25` → `"25.00%"`).
fn format_percent(fraction: Decimal) -> String {
    let percent = (fraction * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", percent)
}
