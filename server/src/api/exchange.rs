//! Currency conversion endpoint.

use axum::extract::{RawQuery, State};
use axum::Json;
use currex_fx::{Exchange, ExchangeRequest, FxError, FxResult};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExchangeParams {
    from: Option<String>,
    to: Option<String>,
    amount: Option<String>,
}

fn parse_request(query: Option<&str>) -> FxResult<ExchangeRequest> {
    let params: ExchangeParams = serde_urlencoded::from_str(query.unwrap_or_default())
        .map_err(|e| FxError::InvalidRequest(format!("Malformed query: {}", e)))?;
    ExchangeRequest::parse(
        params.from.as_deref(),
        params.to.as_deref(),
        params.amount.as_deref(),
    )
}

/// GET /exchange?from=&to=&amount=
pub(crate) async fn exchange(
    State(state): State<SharedState>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<Exchange>> {
    state.metrics.exchange_requested();

    let result = match parse_request(query.as_deref()) {
        Ok(request) => state.exchange.exchange(&request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(exchange) => {
            state.metrics.exchange_resolved(exchange.provenance);
            Ok(Json(exchange))
        }
        Err(e) => {
            if matches!(e, FxError::NoRateAvailable { .. }) {
                state.metrics.exchange_no_rate();
            } else {
                state.metrics.exchange_failed();
            }
            Err(e.into())
        }
    }
}
