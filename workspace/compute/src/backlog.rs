//! Backlog figures derived from the latest order and opportunity books.

use common::{BacklogSummary, BookSnapshot};
use rust_decimal::Decimal;
use tracing::debug;

/// Closing rate applied when the opportunity book carries none (20%).
pub const DEFAULT_CLOSING_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Combines the latest books of an enterprise into a [`BacklogSummary`].
///
/// A missing book counts as zero. A missing or zero closing rate falls back
/// to [`DEFAULT_CLOSING_RATE`]. Results saturate at the decimal range.
pub fn summarize_backlog(
    enterprise_id: i64,
    order_book: Option<&BookSnapshot>,
    opportunity_book: Option<&BookSnapshot>,
) -> BacklogSummary {
    let order_total = order_book.map_or(Decimal::ZERO, |b| b.latest_total);
    let opportunity_total = opportunity_book.map_or(Decimal::ZERO, |b| b.latest_total);
    let closing_rate = opportunity_book
        .and_then(|b| b.pourcentage_closing)
        .filter(|rate| !rate.is_zero())
        .unwrap_or(DEFAULT_CLOSING_RATE);

    let weighted_opportunities = opportunity_total.saturating_mul(closing_rate);
    debug!(
        "Backlog for enterprise {}: orders {}, opportunities {} at {}",
        enterprise_id, order_total, opportunity_total, closing_rate
    );

    BacklogSummary {
        enterprise_id,
        order_book: order_total,
        closing_rate,
        opportunity_total,
        weighted_opportunities,
        total: order_total.saturating_add(weighted_opportunities),
    }
}
