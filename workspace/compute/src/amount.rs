//! Coercion of user-typed amounts into decimals.
//!
//! Cells of the financial table accept free text. Input is read the way a
//! permissive number parser reads it: surrounding whitespace is ignored, the
//! longest leading numeric prefix is used and anything unreadable becomes zero.
//! Amounts beyond [`MAX_AMOUNT`] in magnitude are treated as unreadable too.
//! Nothing here ever reports an error.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;
use std::str::FromStr;
use tracing::trace;

/// Largest magnitude accepted for a single amount (10^15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// A value typed into the table, either already numeric or raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    Amount(Decimal),
    Text(String),
}

impl AmountInput {
    /// Resolves the input to a decimal, mapping invalid input to zero.
    pub fn coerce(&self) -> Decimal {
        match self {
            AmountInput::Amount(amount) => bounded(*amount),
            AmountInput::Text(text) => parse_amount(text),
        }
    }
}

impl From<Decimal> for AmountInput {
    fn from(amount: Decimal) -> Self {
        AmountInput::Amount(amount)
    }
}

impl From<i64> for AmountInput {
    fn from(amount: i64) -> Self {
        AmountInput::Amount(Decimal::from(amount))
    }
}

impl From<f64> for AmountInput {
    fn from(amount: f64) -> Self {
        AmountInput::Amount(Decimal::from_f64(amount).unwrap_or(Decimal::ZERO))
    }
}

impl From<&str> for AmountInput {
    fn from(text: &str) -> Self {
        AmountInput::Text(text.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(text: String) -> Self {
        AmountInput::Text(text)
    }
}

impl From<&Value> for AmountInput {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(number) => AmountInput::Text(number.to_string()),
            Value::String(text) => AmountInput::Text(text.clone()),
            _ => AmountInput::Amount(Decimal::ZERO),
        }
    }
}

/// Parses the leading numeric part of `text`, returning zero when there is none.
///
/// `"12abc"` reads as 12, `"1e3"` as 1000, `"-.5"` as -0.5 and `""` as 0.
pub fn parse_amount(text: &str) -> Decimal {
    let Some(normalized) = numeric_prefix(text.trim()) else {
        trace!("No numeric prefix in {:?}, using zero", text);
        return Decimal::ZERO;
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map(bounded)
        .unwrap_or_else(|_| {
            trace!("Amount {:?} is out of range, using zero", normalized);
            Decimal::ZERO
        })
}

/// Returns `amount` unchanged, or zero when its magnitude exceeds [`MAX_AMOUNT`].
pub fn bounded(amount: Decimal) -> Decimal {
    if amount.abs() > MAX_AMOUNT {
        trace!("Amount {} exceeds {}, using zero", amount, MAX_AMOUNT);
        return Decimal::ZERO;
    }
    amount
}

/// Extracts `[sign] digits [. digits] [e [sign] digits]` from the start of `text`
/// and rewrites it into a form the decimal parser accepts.
fn numeric_prefix(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut normalized = String::new();

    match bytes.first() {
        Some(b'-') => {
            normalized.push('-');
            i += 1;
        }
        Some(b'+') => i += 1,
        _ => {}
    }

    let integer_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let integer = &text[integer_start..i];

    let mut fraction = "";
    if i < bytes.len() && bytes[i] == b'.' {
        let fraction_start = i + 1;
        let mut j = fraction_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        fraction = &text[fraction_start..j];
        i = j;
    }

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    normalized.push_str(if integer.is_empty() { "0" } else { integer });
    if !fraction.is_empty() {
        normalized.push('.');
        normalized.push_str(fraction);
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        let mut exponent = String::from("e");
        match bytes.get(j) {
            Some(b'-') => {
                exponent.push('-');
                j += 1;
            }
            Some(b'+') => j += 1,
            _ => {}
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            exponent.push_str(&text[digits_start..j]);
            normalized.push_str(&exponent);
        }
    }

    Some(normalized)
}

/// Rounds half-way values toward positive infinity (`floor(x + 0.5)`).
///
/// This is the rounding the dashboard applies to simulated amounts, so
/// `2.5` becomes `3` and `-2.5` becomes `-2`. Returns `None` on overflow.
pub fn round_half_up(value: Decimal) -> Option<Decimal> {
    value.checked_add(Decimal::new(5, 1)).map(|v| v.floor())
}
