//! Lenient decimal deserialization for payloads written by the browser.
//!
//! Approved predictions and backend snapshots carry amounts either as JSON
//! numbers, as decimal strings, or as placeholder text such as `"N/A"`. The
//! `serde-with-str` representation used elsewhere only accepts strings, so
//! these helpers accept every shape and map anything unreadable to `None`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use tracing::trace;

/// Reads a decimal out of an arbitrary JSON value.
///
/// Numbers and numeric strings (plain or scientific notation) are accepted.
/// Everything else yields `None`.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => decimal_from_text(&number.to_string()),
        Value::String(text) => decimal_from_text(text.trim()),
        Value::Null => None,
        other => {
            trace!("Ignoring non-numeric amount: {}", other);
            None
        }
    }
}

fn decimal_from_text(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// `deserialize_with` adapter for `Option<Decimal>` fields.
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

/// `deserialize_with` adapter for required `Decimal` fields; unreadable input is zero.
pub fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_decimal(deserializer)?.unwrap_or(Decimal::ZERO))
}

/// `deserialize_with` adapter for identifiers sent either as numbers or strings.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

/// `deserialize_with` adapter for integer identifiers sent either as numbers or strings.
pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_and_strings() {
        assert_eq!(decimal_from_value(&json!(1500)), Some(Decimal::new(1500, 0)));
        assert_eq!(decimal_from_value(&json!(12.5)), Some(Decimal::new(125, 1)));
        assert_eq!(decimal_from_value(&json!("99.95")), Some(Decimal::new(9995, 2)));
        assert_eq!(decimal_from_value(&json!(" 42 ")), Some(Decimal::new(42, 0)));
        assert_eq!(decimal_from_value(&json!("1e3")), Some(Decimal::new(1000, 0)));
    }

    #[test]
    fn test_placeholders_are_absent() {
        assert_eq!(decimal_from_value(&json!("N/A")), None);
        assert_eq!(decimal_from_value(&json!(null)), None);
        assert_eq!(decimal_from_value(&json!(true)), None);
        assert_eq!(decimal_from_value(&json!([1, 2])), None);
    }
}
