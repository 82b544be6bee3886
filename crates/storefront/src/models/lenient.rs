//! Forgiving numeric decoding for values written by older clients or loose
//! backend documents, where prices and quantities show up as numbers, numeric
//! strings, or not at all.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON value as a decimal amount; anything non-numeric is zero.
#[must_use]
pub fn decimal_or_zero(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
                .or_else(|| leading_number(s, true).and_then(parse_decimal))
                .unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}

/// Interpret a JSON value as a whole number, truncating fractions.
///
/// Returns `None` for anything that is not a number or numeric string.
#[must_use]
pub fn whole_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .and_then(|f| f.trunc().to_i64())
        }),
        Value::String(s) => leading_number(s.trim(), false)?.parse::<i64>().ok(),
        _ => None,
    }
}

/// Numeric prefix of `s`, ignoring whatever text follows it: `"12abc"` is
/// `"12"`, `"4.5 each"` is `"4.5"` (or `"4"` without `fraction`).
fn leading_number(s: &str, fraction: bool) -> Option<&str> {
    let sign = usize::from(s.starts_with(['+', '-']));
    let rest = s.get(sign..)?;
    let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let mut len = int_len;
    let mut digits = int_len;

    if fraction && rest.as_bytes().get(int_len) == Some(&b'.') {
        let frac_len = rest
            .get(int_len + 1..)?
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if frac_len > 0 {
            digits += frac_len;
            len += 1 + frac_len;
        }
    }

    if digits == 0 {
        return None;
    }
    s.get(..sign + len)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(Decimal::from_f64))
}

/// `deserialize_with` adapter for [`decimal_or_zero`].
///
/// # Errors
///
/// Never fails on well-formed JSON.
pub fn deserialize_decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(Decimal::ZERO, decimal_or_zero))
}
