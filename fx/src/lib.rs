//! Currex FX Core
//!
//! Rate resolution and currency conversion over a sparse, directed set of
//! stored exchange rates.
//!
//! # Features
//!
//! - Direct, inverse and single-bridge rate resolution
//! - Fixed-point conversion with half-up rounding to two places
//! - Storage injected through the [`CurrencyLookup`] and [`RateEdgeStore`] traits
//!
//! # Example
//!
//! ```rust,ignore
//! use currex_fx::{ExchangeRequest, ExchangeService};
//!
//! let service = ExchangeService::new(currencies, rates, CurrencyCode::parse("USD")?);
//! let request = ExchangeRequest::parse(Some("GBP"), Some("EUR"), Some("100"))?;
//! let exchange = service.exchange(&request).await?;
//! ```

pub mod store;
pub mod resolver;
pub mod conversion;
pub mod exchange;
pub mod error;

pub use store::{CurrencyLookup, RateEdgeStore};
#[cfg(any(test, feature = "test-utils"))]
pub use store::InMemoryStore;
pub use resolver::{BridgeRoute, Provenance, RateResolver, ResolvedRate};
pub use conversion::{convert, Conversion};
pub use exchange::{Exchange, ExchangeRequest, ExchangeService};
pub use error::{FxError, FxResult};
