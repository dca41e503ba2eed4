//! Conversion of an amount at a resolved rate.

use currex_common::round_money;
use rust_decimal::Decimal;
use serde::Serialize;

/// Rounded input and output of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    /// Requested amount, rounded to two places.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// `amount * rate`, rounded to two places.
    #[serde(with = "rust_decimal::serde::float")]
    pub converted_amount: Decimal,
}

/// Convert `amount` at `rate`.
///
/// The product is taken from the unrounded amount; both figures are then
/// rounded half away from zero to two places. The caller guarantees
/// `amount > 0`. Returns `None` only if the product overflows.
pub fn convert(amount: Decimal, rate: Decimal) -> Option<Conversion> {
    let converted = amount.checked_mul(rate)?;
    Some(Conversion {
        amount: round_money(amount),
        converted_amount: round_money(converted),
    })
}
