//! Shared application state.

use std::sync::Arc;

use currex_common::Result;
use currex_fx::ExchangeService;
use currex_store::{CurrencyRepository, Database, RateRepository};

use crate::config::ServerConfig;
use crate::metrics::{Metrics, SharedMetrics};

/// Everything a request handler needs, injected once at startup.
pub struct AppState {
    pub currencies: CurrencyRepository,
    pub rates: RateRepository,
    pub exchange: ExchangeService,
    pub metrics: SharedMetrics,
}

impl AppState {
    /// Wire repositories and the exchange service over `db`.
    pub fn new(db: &Database, config: &ServerConfig) -> Result<Self> {
        let currencies = db.currencies();
        let rates = db.rates();
        let exchange = ExchangeService::new(
            Arc::new(currencies.clone()),
            Arc::new(rates.clone()),
            config.reference_code()?,
        );

        Ok(Self {
            currencies,
            rates,
            exchange,
            metrics: Arc::new(Metrics::new()),
        })
    }
}

/// State handle shared by the router.
pub type SharedState = Arc<AppState>;
