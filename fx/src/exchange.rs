//! The exchange operation: codes and an amount in, a priced conversion out.

use std::sync::Arc;

use currex_common::{parse_positive_decimal, Currency, CurrencyCode, Side};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use crate::conversion::convert;
use crate::error::{FxError, FxResult};
use crate::resolver::{Provenance, RateResolver, ResolvedRate};
use crate::store::{CurrencyLookup, RateEdgeStore};

/// A validated exchange request.
///
/// Codes are normalized but not checked for shape; a code that can never be
/// registered is reported as an unknown currency when the exchange runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub base: String,
    pub target: String,
    pub amount: Decimal,
}

impl ExchangeRequest {
    /// Validate raw `from`, `to` and `amount` parameters.
    pub fn parse(from: Option<&str>, to: Option<&str>, amount: Option<&str>) -> FxResult<Self> {
        let from = required_param("from", from)?;
        let to = required_param("to", to)?;
        let amount = required_param("amount", amount)?;

        let amount = parse_positive_decimal(amount)
            .ok_or_else(|| FxError::InvalidAmount(amount.to_string()))?;

        Ok(Self {
            base: CurrencyCode::normalize(from),
            target: CurrencyCode::normalize(to),
            amount,
        })
    }
}

fn required_param<'a>(name: &str, value: Option<&'a str>) -> FxResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(FxError::InvalidRequest(format!(
            "Required parameter '{}' is missing",
            name
        ))),
    }
}

/// A priced conversion between two registered currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub base_currency: Currency,
    pub target_currency: Currency,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub converted_amount: Decimal,
    #[serde(skip)]
    pub provenance: Provenance,
}

/// Prices exchanges against injected currency and rate stores.
#[derive(Clone)]
pub struct ExchangeService {
    currencies: Arc<dyn CurrencyLookup>,
    resolver: RateResolver,
}

impl ExchangeService {
    /// Create a service bridging through `reference`.
    pub fn new(
        currencies: Arc<dyn CurrencyLookup>,
        rates: Arc<dyn RateEdgeStore>,
        reference: CurrencyCode,
    ) -> Self {
        let resolver = RateResolver::new(currencies.clone(), rates, reference);
        Self {
            currencies,
            resolver,
        }
    }

    /// Convert `amount` of `base` into `target`.
    ///
    /// Converting a currency into itself prices at rate 1 without consulting
    /// the edge store.
    #[instrument(skip(self), fields(base = %request.base, target = %request.target, amount = %request.amount))]
    pub async fn exchange(&self, request: &ExchangeRequest) -> FxResult<Exchange> {
        let base_currency = self.currency(Side::Base, &request.base).await?;
        let target_currency = self.currency(Side::Target, &request.target).await?;

        let resolved = if base_currency.id == target_currency.id {
            ResolvedRate::identity()
        } else {
            self.resolver
                .resolve(base_currency.id, target_currency.id)
                .await
                .ok_or_else(|| FxError::NoRateAvailable {
                    base: base_currency.code.clone(),
                    target: target_currency.code.clone(),
                })?
        };

        let conversion = convert(request.amount, resolved.rate)
            .ok_or_else(|| FxError::InvalidAmount(request.amount.to_string()))?;

        info!(
            rate = %resolved.rate,
            provenance = %resolved.provenance,
            converted_amount = %conversion.converted_amount,
            "Exchange priced"
        );

        Ok(Exchange {
            base_currency,
            target_currency,
            rate: resolved.rate,
            amount: conversion.amount,
            converted_amount: conversion.converted_amount,
            provenance: resolved.provenance,
        })
    }

    async fn currency(&self, side: Side, raw: &str) -> FxResult<Currency> {
        let unknown = || FxError::UnknownCurrency {
            side,
            code: raw.to_string(),
        };
        let code = CurrencyCode::parse(raw).map_err(|_| unknown())?;
        self.currencies.by_code(&code).await?.ok_or_else(unknown)
    }
}
