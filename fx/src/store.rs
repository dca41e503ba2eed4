//! Storage capabilities the core reads from.

use async_trait::async_trait;
use currex_common::{Currency, CurrencyCode, CurrencyId, RateEdge, Result};

/// Looks up registered currencies.
#[async_trait]
pub trait CurrencyLookup: Send + Sync {
    /// Find a currency by its code.
    async fn by_code(&self, code: &CurrencyCode) -> Result<Option<Currency>>;

    /// Find a currency by its surrogate key.
    async fn by_id(&self, id: CurrencyId) -> Result<Option<Currency>>;
}

/// Reads directed rate edges.
#[async_trait]
pub trait RateEdgeStore: Send + Sync {
    /// Read the edge for the ordered pair, if one is stored.
    async fn read(&self, base: CurrencyId, target: CurrencyId) -> Result<Option<RateEdge>>;
}

/// In-memory currency and rate store for testing.
#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryStore;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

    use async_trait::async_trait;
    use currex_common::{
        Currency, CurrencyCode, CurrencyId, CurrexError, RateEdge, RateId, Result,
    };
    use dashmap::DashMap;
    use rust_decimal::Decimal;

    use super::{CurrencyLookup, RateEdgeStore};

    /// Both capabilities over `DashMap`s, with read counting and fault injection.
    #[derive(Default)]
    pub struct InMemoryStore {
        currencies: DashMap<CurrencyId, Currency>,
        rates: DashMap<(CurrencyId, CurrencyId), RateEdge>,
        next_currency_id: AtomicI64,
        next_rate_id: AtomicI64,
        edge_reads: AtomicI64,
        fail_reads: AtomicBool,
    }

    impl InMemoryStore {
        /// Create an empty store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a currency, assigning the next id.
        pub fn add_currency(&self, code: &str, name: &str, sign: &str) -> Currency {
            let id = CurrencyId::new(self.next_currency_id.fetch_add(1, Ordering::SeqCst) + 1);
            let code = CurrencyCode::parse(code).expect("valid test currency code");
            let currency = Currency::new(id, code, name, sign);
            self.currencies.insert(id, currency.clone());
            currency
        }

        /// Insert or overwrite the edge for an ordered pair.
        pub fn set_rate(&self, base: CurrencyId, target: CurrencyId, rate: Decimal) -> RateEdge {
            let mut entry = self.rates.entry((base, target)).or_insert_with(|| {
                let id = RateId::new(self.next_rate_id.fetch_add(1, Ordering::SeqCst) + 1);
                RateEdge::new(id, base, target, rate)
            });
            entry.rate = rate;
            entry.clone()
        }

        /// Number of edge reads served so far.
        pub fn edge_reads(&self) -> i64 {
            self.edge_reads.load(Ordering::SeqCst)
        }

        /// Make every subsequent edge read fail.
        pub fn fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CurrencyLookup for InMemoryStore {
        async fn by_code(&self, code: &CurrencyCode) -> Result<Option<Currency>> {
            Ok(self
                .currencies
                .iter()
                .find(|c| &c.code == code)
                .map(|c| c.clone()))
        }

        async fn by_id(&self, id: CurrencyId) -> Result<Option<Currency>> {
            Ok(self.currencies.get(&id).map(|c| c.clone()))
        }
    }

    #[async_trait]
    impl RateEdgeStore for InMemoryStore {
        async fn read(&self, base: CurrencyId, target: CurrencyId) -> Result<Option<RateEdge>> {
            self.edge_reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(CurrexError::DatabaseError("injected read failure".into()));
            }
            Ok(self.rates.get(&(base, target)).map(|r| r.clone()))
        }
    }
}
