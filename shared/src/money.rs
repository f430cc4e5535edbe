//! Money helpers using rust_decimal for precision
//!
//! Amounts are kept as `Decimal` end to end and persisted as canonical
//! decimal text, so sums never drift.

use rust_decimal::prelude::*;
use thiserror::Error;

/// Display precision for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Currency glyph embedded in user-facing text (Bangladeshi taka)
pub const CURRENCY_GLYPH: &str = "৳";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid decimal amount: {0:?}")]
    Invalid(String),
}

/// Round to 2 decimal places using half-up rounding
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Format with exactly two decimals, no glyph ("110.00")
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// Format with the currency glyph ("৳110.00")
pub fn format_currency(value: Decimal) -> String {
    format!("{}{}", CURRENCY_GLYPH, format_amount(value))
}

/// Parse a persisted amount
pub fn parse_amount(raw: &str) -> Result<Decimal, MoneyError> {
    Decimal::from_str(raw.trim()).map_err(|_| MoneyError::Invalid(raw.to_string()))
}

/// Canonical text form used for storage (trailing zeros removed)
pub fn to_storage(value: Decimal) -> String {
    value.normalize().to_string()
}
