//! The revenue table the allocation calculator operates on.

use common::{ApprovedPrediction, MONTHS_PER_YEAR};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::amount::bounded;
use crate::error::{ComputeError, Result};

/// Twelve monthly amounts, January first.
pub type MonthlyValues = [Decimal; MONTHS_PER_YEAR];

/// A named revenue line with its twelve monthly actual values.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueCategory {
    pub name: String,
    /// External revenue line identifier used by the backend
    pub revenue_id: String,
    pub months: MonthlyValues,
}

impl RevenueCategory {
    /// Sum of the twelve months, `None` on overflow.
    pub fn total(&self) -> Option<Decimal> {
        self.months
            .iter()
            .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value))
    }
}

/// Categories keyed by unique name plus the user-supplied simulation target.
///
/// Categories keep the order in which they were first inserted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RevenueTable {
    categories: Vec<RevenueCategory>,
    simulated_grand_total: Decimal,
}

impl RevenueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from approved predictions.
    ///
    /// Each record's targeted revenue becomes a category holding the record's
    /// edited values; absent or oversized values read as zero. A record for an
    /// already present category replaces its values and identifier but keeps
    /// its position.
    pub fn from_approved(predictions: &[ApprovedPrediction]) -> Self {
        let mut table = Self::new();
        for prediction in predictions {
            let values = prediction
                .edited_values()
                .map(|value| value.map(bounded).unwrap_or(Decimal::ZERO));
            table.upsert_category(&prediction.targeted_revenue, &prediction.revenue_id, values);
        }
        debug!(
            "Built revenue table with {} categories from {} approved predictions",
            table.len(),
            predictions.len()
        );
        table
    }

    /// Inserts or replaces a category.
    ///
    /// Missing months are filled with zero and values past December are dropped.
    pub fn upsert_category(
        &mut self,
        name: &str,
        revenue_id: &str,
        values: impl IntoIterator<Item = Decimal>,
    ) {
        let months = to_monthly(values);
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                trace!("Replacing values of category {}", name);
                existing.revenue_id = revenue_id.to_string();
                existing.months = months;
            }
            None => {
                trace!("Adding category {}", name);
                self.categories.push(RevenueCategory {
                    name: name.to_string(),
                    revenue_id: revenue_id.to_string(),
                    months,
                });
            }
        }
    }

    pub fn categories(&self) -> &[RevenueCategory] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&RevenueCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn simulated_grand_total(&self) -> Decimal {
        self.simulated_grand_total
    }

    pub fn set_simulated_grand_total(&mut self, value: Decimal) {
        self.simulated_grand_total = value;
    }

    /// Overwrites a single cell.
    pub fn set_month(&mut self, category: &str, month: usize, value: Decimal) -> Result<()> {
        if month >= MONTHS_PER_YEAR {
            return Err(ComputeError::MonthOutOfRange(month));
        }
        let entry = self
            .categories
            .iter_mut()
            .find(|c| c.name == category)
            .ok_or_else(|| ComputeError::UnknownCategory(category.to_string()))?;
        entry.months[month] = value;
        Ok(())
    }
}

fn to_monthly(values: impl IntoIterator<Item = Decimal>) -> MonthlyValues {
    let mut months = [Decimal::ZERO; MONTHS_PER_YEAR];
    for (slot, value) in months.iter_mut().zip(values) {
        *slot = value;
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::MonthRow;

    fn prediction(category: &str, revenue_id: &str, edited: &[i64]) -> ApprovedPrediction {
        ApprovedPrediction {
            company_name: None,
            enterprise_name: None,
            enterprise_id: 1,
            targeted_revenue: category.to_string(),
            revenue_id: revenue_id.to_string(),
            growth_rate: None,
            prediction_type: "history".to_string(),
            prediction_year: None,
            table_data: edited
                .iter()
                .map(|v| MonthRow::predicted("m", Decimal::from(*v)))
                .collect(),
        }
    }

    #[test]
    fn test_from_approved_pads_missing_months() {
        let table = RevenueTable::from_approved(&[prediction("Products", "1", &[10, 20, 30])]);

        let products = table.category("Products").unwrap();
        assert_eq!(products.revenue_id, "1");
        assert_eq!(products.months[0], Decimal::from(10));
        assert_eq!(products.months[2], Decimal::from(30));
        assert!(products.months[3..].iter().all(|v| v.is_zero()));
        assert_eq!(products.total(), Some(Decimal::from(60)));
    }

    #[test]
    fn test_from_approved_drops_extra_months() {
        let values: Vec<i64> = (1..=14).collect();
        let table = RevenueTable::from_approved(&[prediction("Products", "1", &values)]);

        let products = table.category("Products").unwrap();
        assert_eq!(products.months[11], Decimal::from(12));
        assert_eq!(products.total(), Some(Decimal::from(78)));
    }

    #[test]
    fn test_from_approved_absent_edits_are_zero() {
        let mut record = prediction("Services", "2", &[5, 5]);
        record.table_data[1].edited = None;
        let table = RevenueTable::from_approved(&[record]);

        assert_eq!(table.category("Services").unwrap().total(), Some(Decimal::from(5)));
    }

    #[test]
    fn test_from_approved_oversized_edits_are_zero() {
        let mut record = prediction("Services", "2", &[5, 5]);
        record.table_data[1].edited = Some(Decimal::MAX);
        let table = RevenueTable::from_approved(&[record]);

        assert_eq!(table.category("Services").unwrap().months[1], Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_category_replaces_in_place() {
        let table = RevenueTable::from_approved(&[
            prediction("Products", "1", &[1]),
            prediction("Services", "2", &[2]),
            prediction("Products", "9", &[3]),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.categories()[0].name, "Products");
        assert_eq!(table.categories()[0].revenue_id, "9");
        assert_eq!(table.categories()[0].months[0], Decimal::from(3));
        assert_eq!(table.categories()[1].name, "Services");
    }

    #[test]
    fn test_set_month_errors() {
        let mut table = RevenueTable::from_approved(&[prediction("Products", "1", &[1])]);

        assert_eq!(
            table.set_month("Unknown", 0, Decimal::ONE),
            Err(ComputeError::UnknownCategory("Unknown".to_string()))
        );
        assert_eq!(
            table.set_month("Products", 12, Decimal::ONE),
            Err(ComputeError::MonthOutOfRange(12))
        );

        table.set_month("Products", 11, Decimal::from(7)).unwrap();
        assert_eq!(table.category("Products").unwrap().months[11], Decimal::from(7));
    }
}
