//! Bulk submission payload built from an allocation.

use common::{BulkIncomeDetailRequest, IncomeDetail};
use tracing::debug;

use crate::allocation::Allocation;

/// Builds one income-detail record per category.
///
/// Monthly values come from the simulated view when `use_simulated_values` is
/// set and from the actual view otherwise; each record's `total` is the sum of
/// the twelve values it carries.
pub fn build_submission_payload(
    allocation: &Allocation,
    enterprise_id: i64,
    prediction_year: i32,
    use_simulated_values: bool,
) -> BulkIncomeDetailRequest {
    let income_details: Vec<IncomeDetail> = allocation
        .categories
        .iter()
        .map(|category| {
            IncomeDetail::new(
                enterprise_id,
                category.revenue_id.clone(),
                category.name.clone(),
                prediction_year,
                *category.values(use_simulated_values),
            )
        })
        .collect();

    debug!(
        "Built submission payload with {} records for enterprise {} ({} view)",
        income_details.len(),
        enterprise_id,
        if use_simulated_values { "simulated" } else { "actual" }
    );

    BulkIncomeDetailRequest::new(income_details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::compute_all;
    use crate::table::RevenueTable;
    use rust_decimal::Decimal;

    fn allocation() -> Allocation {
        let mut table = RevenueTable::new();
        // A sums to 600, B sums to 400
        table.upsert_category(
            "A",
            "rev-a",
            [10, 20, 30, 40, 50, 60, 70, 80, 60, 70, 60, 50].map(Decimal::from),
        );
        table.upsert_category("B", "rev-b", [Decimal::from(100), Decimal::from(300)]);
        table.set_simulated_grand_total(Decimal::from(2000));
        compute_all(&table).unwrap()
    }

    #[test]
    fn test_actual_payload() {
        let allocation = allocation();
        let payload = build_submission_payload(&allocation, 5, 2026, false);

        assert_eq!(payload.income_details.len(), 2);
        let a = &payload.income_details[0];
        let b = &payload.income_details[1];

        assert_eq!(a.category, "A");
        assert_eq!(a.revenue_id, "rev-a");
        assert_eq!(a.enterprise_id, 5);
        assert_eq!(a.prediction_year, 2026);
        assert_eq!(a.total, Decimal::from(600));
        assert_eq!(a.months(), allocation.category("A").unwrap().actual);

        assert_eq!(b.total, Decimal::from(400));
        assert_eq!(b.month1, Decimal::from(100));
        assert_eq!(b.month2, Decimal::from(300));
        assert_eq!(b.month3, Decimal::ZERO);
    }

    #[test]
    fn test_simulated_payload() {
        let allocation = allocation();
        let payload = build_submission_payload(&allocation, 5, 2026, true);

        let b = &payload.income_details[1];
        // B holds 40% of the grand total: 800, split 1/4 and 3/4
        assert_eq!(b.month1, Decimal::from(200));
        assert_eq!(b.month2, Decimal::from(600));
        assert_eq!(b.total, Decimal::from(800));
        assert_eq!(
            payload.income_details[0].months(),
            allocation.category("A").unwrap().simulated
        );
    }

    #[test]
    fn test_empty_table_gives_empty_payload() {
        let payload = build_submission_payload(&compute_all(&RevenueTable::new()).unwrap(), 1, 2026, true);
        assert!(payload.is_empty());
    }
}
