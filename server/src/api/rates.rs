//! Exchange rate endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use currex_common::{
    parse_positive_decimal, required_field, Currency, CurrencyPairCode, CurrexError, RateEdge,
    RateId, Side,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{lookup_currency, parse_form};
use crate::error::ApiResult;
use crate::state::SharedState;

/// A rate edge with both currencies expanded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RateView {
    id: RateId,
    base_currency: Currency,
    target_currency: Currency,
    #[serde(with = "rust_decimal::serde::float")]
    rate: Decimal,
}

impl RateView {
    fn new(edge: RateEdge, base_currency: Currency, target_currency: Currency) -> Self {
        Self {
            id: edge.id,
            base_currency,
            target_currency,
            rate: edge.rate,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewRateForm {
    base_currency_code: Option<String>,
    target_currency_code: Option<String>,
    rate: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RateForm {
    rate: Option<String>,
}

fn parse_rate(raw: Option<&str>) -> Result<Decimal, CurrexError> {
    let raw = required_field("rate", raw.unwrap_or_default())?;
    parse_positive_decimal(raw).ok_or(CurrexError::InvalidRate)
}

fn pair_code(base: &Currency, target: &Currency) -> CurrencyPairCode {
    CurrencyPairCode::new(base.code.clone(), target.code.clone())
}

/// GET /exchangeRates
pub(crate) async fn list_rates(State(state): State<SharedState>) -> ApiResult<Json<Vec<RateView>>> {
    let edges = state.rates.list().await?;
    let mut views = Vec::with_capacity(edges.len());

    for edge in edges {
        let base = state.currencies.find_by_id(edge.base_id).await?;
        let target = state.currencies.find_by_id(edge.target_id).await?;
        match (base, target) {
            (Some(base), Some(target)) => views.push(RateView::new(edge, base, target)),
            _ => warn!(id = %edge.id, "Skipping rate with a dangling currency"),
        }
    }

    Ok(Json(views))
}

/// GET /exchangeRate/{pair}
pub(crate) async fn get_rate(
    State(state): State<SharedState>,
    Path(pair): Path<String>,
) -> ApiResult<Json<RateView>> {
    let (base, target) = CurrencyPairCode::split(&pair)?;
    let base = lookup_currency(&state, &base, CurrexError::CurrencyNotFound).await?;
    let target = lookup_currency(&state, &target, CurrexError::CurrencyNotFound).await?;

    let edge = state
        .rates
        .find(base.id, target.id)
        .await?
        .ok_or_else(|| CurrexError::RateNotFound(pair_code(&base, &target)))?;

    Ok(Json(RateView::new(edge, base, target)))
}

/// GET|PATCH /exchangeRate/
pub(crate) async fn missing_pair() -> ApiResult<Json<RateView>> {
    Err(CurrexError::InvalidRequest("Currency pair codes are missing".to_string()).into())
}

/// POST /exchangeRates
pub(crate) async fn create_rate(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<RateView>)> {
    let form: NewRateForm = parse_form(&body)?;
    let base_code = required_field(
        "baseCurrencyCode",
        form.base_currency_code.as_deref().unwrap_or_default(),
    )?;
    let target_code = required_field(
        "targetCurrencyCode",
        form.target_currency_code.as_deref().unwrap_or_default(),
    )?;
    let rate = parse_rate(form.rate.as_deref())?;

    let base = lookup_currency(&state, base_code, |code| CurrexError::UnknownCurrency {
        side: Side::Base,
        code,
    })
    .await?;
    let target = lookup_currency(&state, target_code, |code| CurrexError::UnknownCurrency {
        side: Side::Target,
        code,
    })
    .await?;

    let edge = state.rates.insert(&base, &target, rate).await?;
    state.metrics.rate_written();
    Ok((StatusCode::CREATED, Json(RateView::new(edge, base, target))))
}

/// PATCH /exchangeRate/{pair}
pub(crate) async fn update_rate(
    State(state): State<SharedState>,
    Path(pair): Path<String>,
    body: Bytes,
) -> ApiResult<Json<RateView>> {
    let (base, target) = CurrencyPairCode::split(&pair)?;
    let form: RateForm = parse_form(&body)?;
    let rate = parse_rate(form.rate.as_deref())?;

    let base = lookup_currency(&state, &base, CurrexError::CurrencyNotFound).await?;
    let target = lookup_currency(&state, &target, CurrexError::CurrencyNotFound).await?;

    let edge = state
        .rates
        .update(&base, &target, rate)
        .await?
        .ok_or_else(|| CurrexError::RateNotFound(pair_code(&base, &target)))?;

    state.metrics.rate_written();
    Ok(Json(RateView::new(edge, base, target)))
}
