//! HTTP surface: routing, CORS and the small handlers that need no module.

mod currencies;
mod exchange;
mod rates;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use currex_common::{Currency, CurrencyCode, CurrexError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ApiResult;
use crate::metrics::MetricsSnapshot;
use crate::state::SharedState;

/// Build the application router over shared state.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route(
            "/currencies",
            get(currencies::list_currencies).post(currencies::create_currency),
        )
        .route("/currency/", get(currencies::missing_currency_code))
        .route("/currency/:code", get(currencies::get_currency))
        .route(
            "/exchangeRates",
            get(rates::list_rates).post(rates::create_rate),
        )
        .route(
            "/exchangeRate/",
            get(rates::missing_pair).patch(rates::missing_pair),
        )
        .route(
            "/exchangeRate/:pair",
            get(rates::get_rate).patch(rates::update_rate),
        )
        .route("/exchange", get(exchange::exchange))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(cors)
        .with_state(state)
}

/// Decode a form-urlencoded request body.
pub(crate) fn parse_form<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    if body.is_empty() {
        return Err(CurrexError::InvalidRequest("Request body is required".to_string()).into());
    }
    serde_urlencoded::from_bytes(body)
        .map_err(|e| CurrexError::InvalidRequest(format!("Malformed form body: {}", e)).into())
}

/// Look up a currency by raw code. A malformed code can never be registered,
/// so it is reported through `not_found` like an unregistered one.
pub(crate) async fn lookup_currency(
    state: &SharedState,
    raw: &str,
    not_found: impl Fn(String) -> CurrexError,
) -> ApiResult<Currency> {
    let code = match CurrencyCode::parse(raw) {
        Ok(code) => code,
        Err(_) => return Err(not_found(CurrencyCode::normalize(raw)).into()),
    };
    match state.currencies.find_by_code(&code).await? {
        Some(currency) => Ok(currency),
        None => Err(not_found(code.into()).into()),
    }
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    #[serde(flatten)]
    metrics: MetricsSnapshot,
}

async fn health(State(state): State<SharedState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        metrics: state.metrics.snapshot(),
    })
}

async fn metrics(State(state): State<SharedState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}
