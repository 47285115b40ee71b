//! Decimal parsing for money-like values.
//!
//! Two entry points exist on purpose: [`parse_amount`] rejects anything it cannot
//! read and is what user input goes through, while [`coerce_decimal`] is the
//! lenient reader used when loading tables written by older versions.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{LedgerError, Result};

/// Largest magnitude accepted for a stored amount or rate (10^15). Totals over any
/// realistic number of rows stay well inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Parses a user-supplied amount, accepting `.` or a single `,` as the decimal separator.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let value = normalize(raw)
        .and_then(|text| Decimal::from_str(&text).ok())
        .ok_or_else(|| LedgerError::Validation(format!("`{}` is not a valid amount", raw.trim())))?;
    check_amount(value)
}

/// Rejects values whose magnitude exceeds [`MAX_AMOUNT`].
pub fn check_amount(value: Decimal) -> Result<Decimal> {
    within(value, MAX_AMOUNT).ok_or_else(|| {
        LedgerError::Validation(format!(
            "{value} is out of range; amounts are limited to {MAX_AMOUNT}"
        ))
    })
}

/// `Some(value)` when its magnitude is at most `limit`.
pub fn within(value: Decimal, limit: Decimal) -> Option<Decimal> {
    (value.abs() <= limit).then_some(value)
}

/// Best-effort numeric read for persisted cells. Returns `None` for blank or unreadable text.
pub fn coerce_decimal(raw: &str) -> Option<Decimal> {
    let text = normalize(raw)?;
    if let Ok(value) = Decimal::from_str(&text) {
        return Some(value);
    }
    if let Ok(value) = Decimal::from_scientific(&text) {
        return Some(value);
    }
    text.parse::<f64>()
        .ok()
        .and_then(|value| Decimal::try_from(value).ok())
}

/// Rounds to cents, midpoint away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders a value as a plain two-decimal number (`-1234.50`).
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.is_empty() {
        return None;
    }
    let commas = unsigned.matches(',').count();
    if commas == 1 && !unsigned.contains('.') {
        Some(unsigned.replace(',', "."))
    } else if commas == 0 {
        Some(unsigned.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_comma_separator() {
        assert_eq!(parse_amount("150,50").unwrap(), Decimal::new(15050, 2));
        assert_eq!(parse_amount(" -20.5 ").unwrap(), Decimal::new(-205, 1));
        assert_eq!(parse_amount("+7").unwrap(), Decimal::new(7, 0));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        for raw in ["", "abc", "1,000,000", "12.5.1", "1,5.0"] {
            let err = parse_amount(raw).expect_err("must reject");
            assert!(matches!(err, LedgerError::Validation(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn parse_amount_rejects_values_past_the_limit() {
        assert_eq!(parse_amount("1000000000000000").unwrap(), MAX_AMOUNT);
        assert_eq!(MAX_AMOUNT, Decimal::new(1_000_000_000_000_000, 0));
        for raw in ["1000000000000000.01", "-79228162514264337593543950335"] {
            let err = parse_amount(raw).expect_err("must reject");
            assert!(matches!(err, LedgerError::Validation(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn coerce_decimal_reads_float_and_scientific_text() {
        assert_eq!(coerce_decimal("150.0"), Some(Decimal::new(1500, 1)));
        assert_eq!(coerce_decimal("1e3"), Some(Decimal::new(1000, 0)));
        assert_eq!(coerce_decimal(""), None);
        assert_eq!(coerce_decimal("n/a"), None);
    }

    #[test]
    fn format_amount_rounds_to_cents() {
        assert_eq!(format_amount(Decimal::new(12345, 3)), "12.35");
        assert_eq!(format_amount(Decimal::new(-5, 0)), "-5.00");
    }
}
