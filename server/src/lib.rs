//! Currex HTTP server
//!
//! Exposes the currency registry, the directed rate store and the exchange
//! operation as a JSON API over axum.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod state;

pub use api::router;
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use metrics::{Metrics, MetricsSnapshot};
pub use state::{AppState, SharedState};
