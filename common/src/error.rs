//! Error types for Currex.

use thiserror::Error;

use crate::identifiers::{CurrencyCode, CurrencyPairCode};

/// Which end of a requested conversion a currency sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Base,
    Target,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Base => write!(f, "Base"),
            Side::Target => write!(f, "Target"),
        }
    }
}

/// Main error type for Currex operations.
#[derive(Error, Debug)]
pub enum CurrexError {
    /// Malformed or missing request input.
    #[error("{0}")]
    InvalidRequest(String),

    /// Amount is not a positive number.
    #[error("Invalid amount value")]
    InvalidAmount,

    /// Rate is not a positive number.
    #[error("Invalid rate value")]
    InvalidRate,

    /// Currency looked up directly (by code) does not exist. Carries the
    /// normalized input, which need not be a well-formed code.
    #[error("Currency not found")]
    CurrencyNotFound(String),

    /// One side of a requested pair is not registered.
    #[error("{side} currency '{code}' not found")]
    UnknownCurrency { side: Side, code: String },

    /// No stored edge for the exact ordered pair.
    #[error("Exchange rate not found")]
    RateNotFound(CurrencyPairCode),

    /// Both currencies are known but no direct, inverse or bridged rate exists.
    #[error("Exchange rate not found")]
    NoRateAvailable { base: CurrencyCode, target: CurrencyCode },

    /// Code already registered.
    #[error("Currency with this code already exists")]
    CurrencyExists(CurrencyCode),

    /// Ordered pair already has an edge.
    #[error("Exchange rate for this currency pair already exists")]
    RateExists(CurrencyPairCode),

    /// Database error.
    #[error("Database error")]
    DatabaseError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl CurrexError {
    /// Get a stable machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            CurrexError::InvalidRequest(_) => "INVALID_REQUEST",
            CurrexError::InvalidAmount => "INVALID_AMOUNT",
            CurrexError::InvalidRate => "INVALID_RATE",
            CurrexError::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            CurrexError::UnknownCurrency { .. } => "UNKNOWN_CURRENCY",
            CurrexError::RateNotFound(_) => "RATE_NOT_FOUND",
            CurrexError::NoRateAvailable { .. } => "NO_RATE_AVAILABLE",
            CurrexError::CurrencyExists(_) => "CURRENCY_EXISTS",
            CurrexError::RateExists(_) => "RATE_EXISTS",
            CurrexError::DatabaseError(_) => "DATABASE_ERROR",
            CurrexError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }

    /// HTTP status code this error is reported with.
    pub fn status(&self) -> u16 {
        match self {
            CurrexError::InvalidRequest(_)
            | CurrexError::InvalidAmount
            | CurrexError::InvalidRate => 400,
            CurrexError::CurrencyNotFound(_)
            | CurrexError::UnknownCurrency { .. }
            | CurrexError::RateNotFound(_)
            | CurrexError::NoRateAvailable { .. } => 404,
            CurrexError::CurrencyExists(_) | CurrexError::RateExists(_) => 409,
            CurrexError::DatabaseError(_) | CurrexError::ConfigurationError(_) => 500,
        }
    }

    /// Whether this is a server-side fault rather than a client error.
    pub fn is_internal(&self) -> bool {
        self.status() >= 500
    }
}

/// Result type alias for Currex operations.
pub type Result<T> = std::result::Result<T, CurrexError>;
