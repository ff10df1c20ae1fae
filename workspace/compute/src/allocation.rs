//! Proportional revenue allocation.
//!
//! [`compute_all`] derives every value the financial table shows from a
//! [`RevenueTable`]: category totals, monthly shares, each category's share of
//! the grand total, and the simulated view obtained by spreading the
//! simulated grand total across categories and then across months.
//!
//! Simulated amounts are rounded where they are computed. The rounded months
//! of a category may therefore differ from its rounded simulated total by a
//! unit or more; that drift is kept as is.

use common::MONTHS_PER_YEAR;
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use crate::amount::round_half_up;
use crate::error::{ComputeError, Result};
use crate::table::{MonthlyValues, RevenueTable};

/// Largest magnitude a derived value may take (10^26).
///
/// Percentages and yearly sums are built from derived values without further
/// checks, so they must stay well inside the decimal range.
pub const DERIVED_LIMIT: Decimal = Decimal::from_parts(0xE400_0000, 0xDCC8_0CD2, 0x0052_B7D2, false, 0);

/// Derived values of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAllocation {
    pub name: String,
    pub revenue_id: String,
    pub actual: MonthlyValues,
    pub total: Decimal,
    /// Fraction of `total` contributed by each month, zero when `total` is zero
    pub monthly_shares: MonthlyValues,
    /// Fraction of the grand total, zero when the grand total is zero
    pub share_of_grand_total: Decimal,
    pub simulated_total: Decimal,
    pub simulated: MonthlyValues,
}

impl CategoryAllocation {
    /// Monthly values of the actual or the simulated view.
    pub fn values(&self, simulated: bool) -> &MonthlyValues {
        if simulated { &self.simulated } else { &self.actual }
    }

    /// Total cell of the percentage row: 100 when the category has a positive total.
    pub fn percentage_row_total(&self) -> Decimal {
        if self.total > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }
}

/// Every derived value of a revenue table.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub categories: Vec<CategoryAllocation>,
    pub grand_total: Decimal,
    pub simulated_grand_total: Decimal,
    pub total_actual_by_month: MonthlyValues,
    pub total_simulated_by_month: MonthlyValues,
}

impl Allocation {
    pub fn category(&self, name: &str) -> Option<&CategoryAllocation> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Sum of the simulated monthly totals across the whole table.
    pub fn simulated_monthly_sum(&self) -> Decimal {
        self.total_simulated_by_month.iter().copied().sum()
    }

    /// Recomputes the simulated side for a new target, reusing the actual side.
    ///
    /// Totals, monthly shares and shares of the grand total are copied
    /// unchanged; only simulated totals and simulated months are derived again.
    #[instrument(skip(self), fields(categories = self.categories.len()))]
    pub fn with_target(&self, simulated_grand_total: Decimal) -> Result<Allocation> {
        let mut categories = self.categories.clone();
        let mut total_simulated_by_month = [Decimal::ZERO; MONTHS_PER_YEAR];

        for category in categories.iter_mut() {
            category.simulated_total = checked(
                simulated_grand_total
                    .checked_mul(category.share_of_grand_total)
                    .and_then(round_half_up),
                "simulated category total",
            )?;
            for (month, share) in category.monthly_shares.iter().enumerate() {
                let value = checked(
                    category.simulated_total.checked_mul(*share).and_then(round_half_up),
                    "simulated month",
                )?;
                category.simulated[month] = value;
                total_simulated_by_month[month] = checked(
                    total_simulated_by_month[month].checked_add(value),
                    "simulated monthly total",
                )?;
            }
        }

        debug!(
            "Allocated simulated total {} across {} categories",
            simulated_grand_total,
            categories.len()
        );

        Ok(Allocation {
            categories,
            grand_total: self.grand_total,
            simulated_grand_total,
            total_actual_by_month: self.total_actual_by_month,
            total_simulated_by_month,
        })
    }
}

/// Derives every value of the table from its categories and simulation target.
///
/// The function has no side effects; calling it again on the same table
/// returns an identical result. A derived value beyond [`DERIVED_LIMIT`] is
/// reported as [`ComputeError::Overflow`].
#[instrument(skip(table), fields(categories = table.len()))]
pub fn compute_all(table: &RevenueTable) -> Result<Allocation> {
    compute_actual(table)?.with_target(table.simulated_grand_total())
}

/// Derives the actual side; simulated fields are left at zero.
fn compute_actual(table: &RevenueTable) -> Result<Allocation> {
    let mut total_actual_by_month = [Decimal::ZERO; MONTHS_PER_YEAR];
    let mut categories = Vec::with_capacity(table.len());

    for category in table.categories() {
        let total = checked(category.total(), "category total")?;
        let mut monthly_shares = [Decimal::ZERO; MONTHS_PER_YEAR];
        for (month, value) in category.months.iter().enumerate() {
            monthly_shares[month] = ratio(*value, total, "monthly share")?;
            total_actual_by_month[month] = checked(
                total_actual_by_month[month].checked_add(*value),
                "monthly total",
            )?;
        }

        categories.push(CategoryAllocation {
            name: category.name.clone(),
            revenue_id: category.revenue_id.clone(),
            actual: category.months,
            total,
            monthly_shares,
            share_of_grand_total: Decimal::ZERO,
            simulated_total: Decimal::ZERO,
            simulated: [Decimal::ZERO; MONTHS_PER_YEAR],
        });
    }

    let grand_total = checked(
        categories
            .iter()
            .try_fold(Decimal::ZERO, |acc, c| acc.checked_add(c.total)),
        "grand total",
    )?;
    for category in categories.iter_mut() {
        category.share_of_grand_total = ratio(category.total, grand_total, "share of grand total")?;
    }

    Ok(Allocation {
        categories,
        grand_total,
        simulated_grand_total: Decimal::ZERO,
        total_actual_by_month,
        total_simulated_by_month: [Decimal::ZERO; MONTHS_PER_YEAR],
    })
}

/// `numerator / denominator`, or zero when the denominator is zero.
fn ratio(numerator: Decimal, denominator: Decimal, what: &str) -> Result<Decimal> {
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    checked(numerator.checked_div(denominator), what)
}

/// Unwraps a checked operation, rejecting results beyond [`DERIVED_LIMIT`].
fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal> {
    match value {
        Some(value) if value.abs() <= DERIVED_LIMIT => Ok(value),
        _ => {
            warn!("Overflow while computing {}", what);
            Err(ComputeError::Overflow(what.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epsilon() -> Decimal {
        Decimal::new(1, 6)
    }

    fn table(categories: &[(&str, [i64; 12])], target: i64) -> RevenueTable {
        let mut table = RevenueTable::new();
        for (index, (name, months)) in categories.iter().enumerate() {
            table.upsert_category(name, &index.to_string(), months.iter().map(|v| Decimal::from(*v)));
        }
        table.set_simulated_grand_total(Decimal::from(target));
        table
    }

    #[test]
    fn test_products_and_empty_services() {
        let table = table(&[("Products", [1000; 12]), ("Services", [0; 12])], 24000);
        let allocation = compute_all(&table).unwrap();

        let products = allocation.category("Products").unwrap();
        let services = allocation.category("Services").unwrap();

        assert_eq!(products.total, Decimal::from(12000));
        assert_eq!(services.total, Decimal::ZERO);
        assert_eq!(allocation.grand_total, Decimal::from(12000));
        assert_eq!(products.share_of_grand_total, Decimal::ONE);
        assert_eq!(services.share_of_grand_total, Decimal::ZERO);
        assert_eq!(products.simulated_total, Decimal::from(24000));
        assert_eq!(services.simulated_total, Decimal::ZERO);
        assert!(products.simulated.iter().all(|v| *v == Decimal::from(2000)));
        assert!(services.simulated.iter().all(|v| v.is_zero()));
        assert!(allocation.total_simulated_by_month.iter().all(|v| *v == Decimal::from(2000)));
        assert!(allocation.total_actual_by_month.iter().all(|v| *v == Decimal::from(1000)));
    }

    #[test]
    fn test_zero_category_has_zero_shares() {
        let allocation = compute_all(&table(&[("Empty", [0; 12])], 5000)).unwrap();

        let empty = allocation.category("Empty").unwrap();
        assert!(empty.monthly_shares.iter().all(|v| v.is_zero()));
        assert_eq!(empty.share_of_grand_total, Decimal::ZERO);
        assert_eq!(empty.simulated_total, Decimal::ZERO);
        assert_eq!(empty.percentage_row_total(), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_shares_sum_to_one() {
        let allocation = compute_all(&table(
            &[
                ("Products", [120, 80, 95, 101, 77, 64, 33, 12, 250, 190, 140, 7]),
                ("Services", [3, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 5]),
            ],
            0,
        ))
        .unwrap();

        for category in &allocation.categories {
            let sum: Decimal = category.monthly_shares.iter().copied().sum();
            assert!((sum - Decimal::ONE).abs() < epsilon(), "{} shares sum to {}", category.name, sum);
        }
        let shares: Decimal = allocation.categories.iter().map(|c| c.share_of_grand_total).sum();
        assert!((shares - Decimal::ONE).abs() < epsilon());
    }

    #[test]
    fn test_simulated_totals_approximate_target() {
        let allocation = compute_all(&table(
            &[("A", [1; 12]), ("B", [1; 12]), ("C", [1; 12])],
            1000,
        ))
        .unwrap();

        // 1000 / 3 = 333.33 for each category, rounded to 333
        for category in &allocation.categories {
            assert_eq!(category.simulated_total, Decimal::from(333));
        }
        let sum: Decimal = allocation.categories.iter().map(|c| c.simulated_total).sum();
        assert!((sum - Decimal::from(1000)).abs() <= Decimal::from(3));
    }

    #[test]
    fn test_rounding_drift_is_kept() {
        // 100 spread over twelve equal months is 8.33 each, rounded to 8
        let allocation = compute_all(&table(&[("A", [5; 12])], 100)).unwrap();

        let a = allocation.category("A").unwrap();
        assert_eq!(a.simulated_total, Decimal::from(100));
        assert!(a.simulated.iter().all(|v| *v == Decimal::from(8)));
        assert_eq!(allocation.simulated_monthly_sum(), Decimal::from(96));
    }

    #[test]
    fn test_compute_all_is_idempotent() {
        let table = table(
            &[("Products", [13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59]), ("Services", [7; 12])],
            98765,
        );

        let first = compute_all(&table).unwrap();
        let second = compute_all(&table).unwrap();
        assert_eq!(first, second);
        for (a, b) in first.categories.iter().zip(second.categories.iter()) {
            for month in 0..MONTHS_PER_YEAR {
                assert_eq!(a.monthly_shares[month].serialize(), b.monthly_shares[month].serialize());
                assert_eq!(a.simulated[month].serialize(), b.simulated[month].serialize());
            }
        }
    }

    #[test]
    fn test_with_target_keeps_actual_side() {
        let table = table(&[("Products", [10; 12]), ("Services", [30; 12])], 0);
        let before = compute_all(&table).unwrap();
        let after = before.with_target(Decimal::from(4800)).unwrap();

        assert_eq!(after.grand_total, before.grand_total);
        assert_eq!(after.total_actual_by_month, before.total_actual_by_month);
        for (a, b) in after.categories.iter().zip(before.categories.iter()) {
            assert_eq!(a.actual, b.actual);
            assert_eq!(a.monthly_shares, b.monthly_shares);
            assert_eq!(a.share_of_grand_total, b.share_of_grand_total);
        }
        assert_eq!(after.category("Products").unwrap().simulated_total, Decimal::from(1200));
        assert_eq!(after.category("Services").unwrap().simulated_total, Decimal::from(3600));
        assert_eq!(after.category("Services").unwrap().simulated[0], Decimal::from(300));
    }

    #[test]
    fn test_negative_total_share_is_finite() {
        let allocation = compute_all(&table(&[("Refunds", [-10; 12]), ("Sales", [20; 12])], 120)).unwrap();

        let refunds = allocation.category("Refunds").unwrap();
        assert_eq!(refunds.share_of_grand_total, Decimal::from(-1));
        assert_eq!(refunds.simulated_total, Decimal::from(-120));
        assert_eq!(refunds.percentage_row_total(), Decimal::ZERO);
    }

    #[test]
    fn test_amounts_at_input_bound_compute() {
        let bound = 1_000_000_000_000_000i64;
        let allocation = compute_all(&table(&[("A", [bound; 12]), ("B", [bound; 12])], bound)).unwrap();

        assert_eq!(allocation.grand_total, Decimal::from(bound) * Decimal::from(24));
        assert_eq!(allocation.category("A").unwrap().simulated_total, Decimal::from(bound / 2));
        assert_eq!(allocation.total_actual_by_month[0], Decimal::from(bound) * Decimal::TWO);
    }

    #[test]
    fn test_max_target_is_an_overflow() {
        let before = compute_all(&table(&[("Products", [1000; 12])], 0)).unwrap();

        let err = before.with_target(Decimal::MAX).unwrap_err();
        assert!(matches!(err, ComputeError::Overflow(_)));
    }

    #[test]
    fn test_unbounded_cells_are_an_overflow() {
        let mut table = RevenueTable::new();
        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        table.upsert_category("A", "1", [huge, huge]);

        assert!(matches!(compute_all(&table), Err(ComputeError::Overflow(_))));
    }

    #[test]
    fn test_cancelling_totals_are_an_overflow() {
        // The grand total cancels down to 1, so A's share is 10^15
        let allocation = table(
            &[
                ("A", [1_000_000_000_000_000, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
                ("B", [-999_999_999_999_999, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            ],
            1_000_000_000_000_000,
        );

        let err = compute_all(&allocation).unwrap_err();
        assert_eq!(err, ComputeError::Overflow("simulated category total".to_string()));
    }
}
