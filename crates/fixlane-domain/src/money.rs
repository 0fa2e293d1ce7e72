//! Fixed-point money helpers.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Plain non-negative decimal with at most two fractional digits.
static MONEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("valid money regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("invalid amount: {0:?}")]
    Malformed(String),
    #[error("amount out of range: {0}")]
    OutOfRange(Decimal),
}

/// Parse a user-supplied decimal string such as `"150"` or `"89.90"`.
pub fn parse_money(input: &str) -> Result<Decimal, MoneyError> {
    if !MONEY_PATTERN.is_match(input) {
        return Err(MoneyError::Malformed(input.to_owned()));
    }
    input
        .parse::<Decimal>()
        .map_err(|_| MoneyError::Malformed(input.to_owned()))
}

/// Convert a major-unit amount into gateway minor units (cents).
///
/// Rounds half away from zero, so `150.00 → 15000` and `0.005 → 1`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyError::OutOfRange(amount))
}
