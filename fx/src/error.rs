//! FX error types.

use currex_common::{CurrencyCode, CurrexError, Side};
use thiserror::Error;

/// Errors that can occur while serving an exchange.
#[derive(Debug, Error)]
pub enum FxError {
    /// Request input was missing or malformed.
    #[error("{0}")]
    InvalidRequest(String),

    /// Amount is missing, non-numeric or not positive.
    #[error("Invalid amount value")]
    InvalidAmount(String),

    /// A requested currency code is not registered.
    #[error("{side} currency '{code}' not found")]
    UnknownCurrency { side: Side, code: String },

    /// No direct, inverse or bridged rate exists between known currencies.
    #[error("No exchange rate available for {base}/{target}")]
    NoRateAvailable { base: CurrencyCode, target: CurrencyCode },

    /// Currency lookup failed in the storage collaborator.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

impl From<CurrexError> for FxError {
    fn from(err: CurrexError) -> Self {
        match err {
            CurrexError::InvalidRequest(msg) => FxError::InvalidRequest(msg),
            CurrexError::InvalidAmount => FxError::InvalidAmount("Invalid amount value".into()),
            CurrexError::UnknownCurrency { side, code } => FxError::UnknownCurrency { side, code },
            CurrexError::NoRateAvailable { base, target } => {
                FxError::NoRateAvailable { base, target }
            }
            CurrexError::DatabaseError(msg) => FxError::Storage(msg),
            other => FxError::Storage(other.to_string()),
        }
    }
}

impl From<FxError> for CurrexError {
    fn from(err: FxError) -> Self {
        match err {
            FxError::InvalidRequest(msg) => CurrexError::InvalidRequest(msg),
            FxError::InvalidAmount(_) => CurrexError::InvalidAmount,
            FxError::UnknownCurrency { side, code } => CurrexError::UnknownCurrency { side, code },
            FxError::NoRateAvailable { base, target } => {
                CurrexError::NoRateAvailable { base, target }
            }
            FxError::Storage(msg) => CurrexError::DatabaseError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_domain_error_by_variant() {
        let err: CurrexError = FxError::UnknownCurrency {
            side: Side::Base,
            code: "XYZ".to_string(),
        }
        .into();
        assert_eq!(err.status(), 404);

        let err: CurrexError = FxError::InvalidAmount("-1".into()).into();
        assert_eq!(err.status(), 400);

        let err: CurrexError = FxError::Storage("pool timed out".into()).into();
        assert_eq!(err.status(), 500);
    }
}
