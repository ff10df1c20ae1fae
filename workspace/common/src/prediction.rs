//! Approved prediction records as they are kept in the device-local store.
//!
//! The JSON shape is the one the dashboard writes under the
//! `approvedPredictions` key, so records approved in the browser load as-is.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::lenient;

/// One month of an approved prediction table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonthRow {
    /// Month label (e.g. "Jan")
    pub month: String,
    /// Real income two years before the prediction year
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub year_before_last: Option<Decimal>,
    /// Real income the year before the prediction year
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub last_year: Option<Decimal>,
    /// Value predicted by the backend
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub predicted: Option<Decimal>,
    /// Value after the user's inline edits
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub edited: Option<Decimal>,
}

impl MonthRow {
    /// Creates a row whose predicted and edited values are the same.
    pub fn predicted(month: impl Into<String>, value: Decimal) -> Self {
        Self {
            month: month.into(),
            predicted: Some(value),
            edited: Some(value),
            ..Default::default()
        }
    }
}

/// Prediction year, either numeric or a free label such as "Future".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictionYear {
    Year(i32),
    Label(String),
}

impl PredictionYear {
    /// Returns the numeric year if there is one.
    pub fn year(&self) -> Option<i32> {
        match self {
            PredictionYear::Year(year) => Some(*year),
            PredictionYear::Label(label) => label.trim().parse().ok(),
        }
    }
}

/// A prediction the user approved for one targeted revenue line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedPrediction {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub enterprise_name: Option<String>,
    #[serde(deserialize_with = "lenient::integer")]
    pub enterprise_id: i64,
    /// Revenue line the prediction targets; becomes the category name
    pub targeted_revenue: String,
    /// External revenue line identifier
    #[serde(deserialize_with = "lenient::text")]
    pub revenue_id: String,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub growth_rate: Option<Decimal>,
    /// Prediction method (e.g. "history", "unit_sold")
    pub prediction_type: String,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub prediction_year: Option<PredictionYear>,
    #[serde(default)]
    pub table_data: Vec<MonthRow>,
}

impl ApprovedPrediction {
    /// Whether both records describe the same approval slot.
    ///
    /// Two records share a slot when enterprise, targeted revenue, prediction
    /// type and revenue identifier all match.
    pub fn same_slot(&self, other: &ApprovedPrediction) -> bool {
        self.enterprise_id == other.enterprise_id
            && self.targeted_revenue == other.targeted_revenue
            && self.prediction_type == other.prediction_type
            && self.revenue_id == other.revenue_id
    }

    /// Edited monthly values in table order; absent values are `None`.
    pub fn edited_values(&self) -> impl Iterator<Item = Option<Decimal>> + '_ {
        self.table_data.iter().map(|row| row.edited)
    }
}
