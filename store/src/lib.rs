//! Currex Store
//!
//! SQLite persistence for currencies and directed exchange rates. The
//! repositories implement the lookup traits the FX core reads through, plus
//! the registration and rate maintenance writes.

pub mod db;
pub mod currencies;
pub mod rates;

pub use db::Database;
pub use currencies::CurrencyRepository;
pub use rates::RateRepository;
