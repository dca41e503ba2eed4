//! Connection pool, schema bootstrap and seed data.

use std::str::FromStr;

use currex_common::{CurrexError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{error, info};

use crate::currencies::CurrencyRepository;
use crate::rates::RateRepository;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS currencies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        code TEXT NOT NULL UNIQUE,
        fullname TEXT NOT NULL,
        sign TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS exchange_rates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        base_currency_id INTEGER NOT NULL REFERENCES currencies(id),
        target_currency_id INTEGER NOT NULL REFERENCES currencies(id),
        rate TEXT NOT NULL,
        UNIQUE(base_currency_id, target_currency_id)
    )
    "#,
];

/// Currencies registered on first start.
pub const SEED_CURRENCIES: &[(&str, &str, &str)] = &[
    ("USD", "United States dollar", "$"),
    ("EUR", "Euro", "€"),
    ("RUB", "Russian ruble", "₽"),
    ("AUD", "Australian dollar", "A$"),
    ("JPY", "Japanese yen", "¥"),
    ("GBP", "British pound sterling", "£"),
    ("CAD", "Canadian dollar", "C$"),
];

/// Rate edges (base, target, rate) registered on first start.
pub const SEED_RATES: &[(&str, &str, &str)] = &[
    ("USD", "EUR", "0.91"),
    ("USD", "RUB", "93.45"),
    ("USD", "AUD", "1.45"),
    ("USD", "JPY", "149.50"),
    ("USD", "GBP", "0.79"),
    ("USD", "CAD", "1.35"),
    ("EUR", "GBP", "0.87"),
    ("GBP", "JPY", "189.24"),
];

/// Map a driver error to the domain error, logging the detail.
pub(crate) fn db_error(err: sqlx::Error) -> CurrexError {
    error!(error = %err, "Database operation failed");
    CurrexError::DatabaseError(err.to_string())
}

/// Handle to the SQLite database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool against `url`, creating the file if missing.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| CurrexError::ConfigurationError(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        info!(url = %url, max_connections, "Connected to database");
        Ok(Self { pool })
    }

    /// Open a private in-memory database on a single pinned connection.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(db_error)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        Ok(Self { pool })
    }

    /// Create tables if they do not exist.
    pub async fn bootstrap(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
        }
        info!("Database schema ready");
        Ok(())
    }

    /// Insert the default currencies and rates, skipping any already present.
    pub async fn seed(&self) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for (code, name, sign) in SEED_CURRENCIES {
            sqlx::query("INSERT OR IGNORE INTO currencies (code, fullname, sign) VALUES (?, ?, ?)")
                .bind(*code)
                .bind(*name)
                .bind(*sign)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        for (base, target, rate) in SEED_RATES {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO exchange_rates (base_currency_id, target_currency_id, rate)
                SELECT b.id, t.id, ?
                FROM currencies b, currencies t
                WHERE b.code = ? AND t.code = ?
                "#,
            )
            .bind(*rate)
            .bind(*base)
            .bind(*target)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        info!(
            currencies = SEED_CURRENCIES.len(),
            rates = SEED_RATES.len(),
            "Seed data applied"
        );
        Ok(())
    }

    /// Currency repository over this pool.
    pub fn currencies(&self) -> CurrencyRepository {
        CurrencyRepository::new(self.pool.clone())
    }

    /// Rate repository over this pool.
    pub fn rates(&self) -> RateRepository {
        RateRepository::new(self.pool.clone())
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_and_seed_are_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.bootstrap().await.unwrap();
        db.bootstrap().await.unwrap();
        db.seed().await.unwrap();
        db.seed().await.unwrap();

        let currencies = db.currencies().list().await.unwrap();
        assert_eq!(currencies.len(), SEED_CURRENCIES.len());
        assert_eq!(currencies[0].code.as_str(), "USD");

        let rates = db.rates().list().await.unwrap();
        assert_eq!(rates.len(), SEED_RATES.len());
    }
}
