//! Monetary types for Currex.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CurrexError;
use crate::identifiers::{CurrencyCode, CurrencyId, RateId};

/// Fractional digits of every reported amount.
pub const MONEY_SCALE: u32 = 2;

/// Round a monetary value to [`MONEY_SCALE`] digits, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Parse a strictly positive decimal, accepting plain or scientific notation.
pub fn parse_positive_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()?;
    (value > Decimal::ZERO).then_some(value)
}

/// A registered currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Surrogate key.
    pub id: CurrencyId,
    /// Display name, e.g. "Euro".
    pub name: String,
    /// Unique three-letter code.
    pub code: CurrencyCode,
    /// Symbol, e.g. "€".
    pub sign: String,
}

impl Currency {
    /// Create a currency record.
    pub fn new(
        id: CurrencyId,
        code: CurrencyCode,
        name: impl Into<String>,
        sign: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            code,
            sign: sign.into(),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}

/// A currency that has not been registered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCurrency {
    pub code: CurrencyCode,
    pub name: String,
    pub sign: String,
}

impl NewCurrency {
    /// Validate raw registration fields.
    pub fn parse(name: &str, code: &str, sign: &str) -> Result<Self, CurrexError> {
        let name = required_field("name", name)?;
        let code = required_field("code", code)?;
        let sign = required_field("sign", sign)?;

        Ok(Self {
            code: CurrencyCode::parse(code)?,
            name: name.to_string(),
            sign: sign.to_string(),
        })
    }
}

/// Trimmed value of a required form field, or an error naming the field.
pub fn required_field<'a>(field: &str, value: &'a str) -> Result<&'a str, CurrexError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CurrexError::InvalidRequest(format!(
            "Required field '{}' is missing",
            field
        )));
    }
    Ok(value)
}

/// A stored directed rate: 1 unit of base = `rate` units of target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEdge {
    /// Surrogate key.
    pub id: RateId,
    /// Base currency.
    pub base_id: CurrencyId,
    /// Target currency.
    pub target_id: CurrencyId,
    /// Strictly positive rate.
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
}

impl RateEdge {
    /// Create a rate edge record.
    pub fn new(id: RateId, base_id: CurrencyId, target_id: CurrencyId, rate: Decimal) -> Self {
        Self {
            id,
            base_id,
            target_id,
            rate,
        }
    }
}

impl fmt::Display for RateEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{} @ {}", self.base_id, self.target_id, self.rate)
    }
}
