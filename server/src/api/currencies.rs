//! Currency endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use currex_common::{Currency, CurrencyCode, CurrexError, NewCurrency};
use serde::Deserialize;

use super::{lookup_currency, parse_form};
use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CurrencyForm {
    name: Option<String>,
    code: Option<String>,
    sign: Option<String>,
}

/// GET /currencies
pub(crate) async fn list_currencies(State(state): State<SharedState>) -> ApiResult<Json<Vec<Currency>>> {
    Ok(Json(state.currencies.list().await?))
}

/// GET /currency/{code}
pub(crate) async fn get_currency(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Currency>> {
    if CurrencyCode::normalize(&code).is_empty() {
        return missing_currency_code().await;
    }
    let currency = lookup_currency(&state, &code, CurrexError::CurrencyNotFound).await?;
    Ok(Json(currency))
}

/// GET /currency/
pub(crate) async fn missing_currency_code() -> ApiResult<Json<Currency>> {
    Err(CurrexError::InvalidRequest("Currency code is missing".to_string()).into())
}

/// POST /currencies
pub(crate) async fn create_currency(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Currency>)> {
    let form: CurrencyForm = parse_form(&body)?;
    let new_currency = NewCurrency::parse(
        form.name.as_deref().unwrap_or_default(),
        form.code.as_deref().unwrap_or_default(),
        form.sign.as_deref().unwrap_or_default(),
    )?;

    let currency = state.currencies.insert(new_currency).await?;
    state.metrics.currency_created();
    Ok((StatusCode::CREATED, Json(currency)))
}
