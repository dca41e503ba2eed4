//! Identifier types for Currex entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CurrexError;

/// Storage-assigned surrogate key of a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyId(i64);

impl CurrencyId {
    /// Create a currency ID from a raw key.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw key.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage-assigned surrogate key of a rate edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateId(i64);

impl RateId {
    /// Create a rate ID from a raw key.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw key.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Three-letter uppercase currency code, the natural key of a currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Length of every currency code.
    pub const LEN: usize = 3;

    /// Trim and uppercase raw input without validating it.
    ///
    /// Lookups use this form to report codes that can never be registered.
    pub fn normalize(code: &str) -> String {
        code.trim().to_ascii_uppercase()
    }

    /// Parse a code, trimming and uppercasing the input.
    pub fn parse(code: &str) -> Result<Self, CurrexError> {
        let code = Self::normalize(code);
        if code.is_empty() {
            return Err(CurrexError::InvalidRequest(
                "Currency code is missing".to_string(),
            ));
        }
        if code.len() != Self::LEN || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrexError::InvalidRequest(
                "Currency code must be 3 characters".to_string(),
            ));
        }
        Ok(Self(code))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// A concatenated pair of codes as used in paths, e.g. `USDEUR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyPairCode {
    /// Base currency code.
    pub base: CurrencyCode,
    /// Target currency code.
    pub target: CurrencyCode,
}

impl CurrencyPairCode {
    /// Create a pair from two codes.
    pub fn new(base: CurrencyCode, target: CurrencyCode) -> Self {
        Self { base, target }
    }

    /// Split a six-character pair such as `usdeur` into normalized halves.
    ///
    /// The halves are not validated as codes; callers resolve them against
    /// the registry and report unknown ones as not found.
    pub fn split(pair: &str) -> Result<(String, String), CurrexError> {
        let pair = CurrencyCode::normalize(pair);
        if pair.is_empty() {
            return Err(CurrexError::InvalidRequest(
                "Currency pair codes are missing".to_string(),
            ));
        }
        if pair.len() != 2 * CurrencyCode::LEN || !pair.is_ascii() {
            return Err(CurrexError::InvalidRequest(
                "Invalid currency pair format".to_string(),
            ));
        }

        let (base, target) = pair.split_at(CurrencyCode::LEN);
        Ok((base.to_string(), target.to_string()))
    }
}

impl fmt::Display for CurrencyPairCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.target)
    }
}
