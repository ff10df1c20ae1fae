//! Bulk income-detail payload accepted by the forecasting backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One revenue line of a bulk submission.
///
/// Field names follow the backend serializer: `enterpriseId`, `revenueId`,
/// `category`, `predictionYear`, `month1`..`month12` and `total`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncomeDetail {
    pub enterprise_id: i64,
    pub revenue_id: String,
    pub category: String,
    pub prediction_year: i32,
    pub month1: Decimal,
    pub month2: Decimal,
    pub month3: Decimal,
    pub month4: Decimal,
    pub month5: Decimal,
    pub month6: Decimal,
    pub month7: Decimal,
    pub month8: Decimal,
    pub month9: Decimal,
    pub month10: Decimal,
    pub month11: Decimal,
    pub month12: Decimal,
    /// Sum of the twelve monthly values
    pub total: Decimal,
}

impl IncomeDetail {
    /// Builds a record from twelve monthly values; `total` is their sum.
    pub fn new(
        enterprise_id: i64,
        revenue_id: impl Into<String>,
        category: impl Into<String>,
        prediction_year: i32,
        months: [Decimal; 12],
    ) -> Self {
        let total = months.iter().copied().sum();
        let [
            month1,
            month2,
            month3,
            month4,
            month5,
            month6,
            month7,
            month8,
            month9,
            month10,
            month11,
            month12,
        ] = months;

        Self {
            enterprise_id,
            revenue_id: revenue_id.into(),
            category: category.into(),
            prediction_year,
            month1,
            month2,
            month3,
            month4,
            month5,
            month6,
            month7,
            month8,
            month9,
            month10,
            month11,
            month12,
            total,
        }
    }

    /// Monthly values in calendar order.
    pub fn months(&self) -> [Decimal; 12] {
        [
            self.month1,
            self.month2,
            self.month3,
            self.month4,
            self.month5,
            self.month6,
            self.month7,
            self.month8,
            self.month9,
            self.month10,
            self.month11,
            self.month12,
        ]
    }
}

/// Request body of `POST /bulk-income-detail/`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct BulkIncomeDetailRequest {
    pub income_details: Vec<IncomeDetail>,
}

impl BulkIncomeDetailRequest {
    pub fn new(income_details: Vec<IncomeDetail>) -> Self {
        Self { income_details }
    }

    pub fn is_empty(&self) -> bool {
        self.income_details.is_empty()
    }
}
