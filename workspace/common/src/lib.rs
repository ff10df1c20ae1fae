//! Common transport-layer types shared between the simulation service, the
//! presentation layer and the forecasting backend.
//! These structs mirror the JSON payloads exchanged with the browser and the
//! backend so every crate deserializes them without duplicating shapes.

pub mod lenient;

mod books;
mod income_detail;
mod prediction;
mod simulation;

pub use books::{BacklogSummary, BookSnapshot};
pub use income_detail::{BulkIncomeDetailRequest, IncomeDetail};
pub use prediction::{ApprovedPrediction, MonthRow, PredictionYear};
pub use simulation::{CategorySummary, RowKind, SimulationSnapshot, TableRow};

/// Number of monthly columns in every revenue table.
pub const MONTHS_PER_YEAR: usize = 12;

/// Month labels used by the financial table, January first.
pub const MONTH_LABELS: [&str; MONTHS_PER_YEAR] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];
