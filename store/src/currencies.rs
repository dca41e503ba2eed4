//! Currency repository.

use async_trait::async_trait;
use currex_common::{Currency, CurrencyCode, CurrencyId, CurrexError, NewCurrency, Result};
use currex_fx::CurrencyLookup;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use crate::db::db_error;

#[derive(Debug, sqlx::FromRow)]
struct CurrencyRow {
    id: i64,
    code: String,
    fullname: String,
    sign: String,
}

impl TryFrom<CurrencyRow> for Currency {
    type Error = CurrexError;

    fn try_from(row: CurrencyRow) -> Result<Self> {
        let code = CurrencyCode::parse(&row.code).map_err(|_| {
            CurrexError::DatabaseError(format!("Stored currency {} has invalid code", row.id))
        })?;
        Ok(Currency::new(CurrencyId::new(row.id), code, row.fullname, row.sign))
    }
}

/// Reads and registers currencies.
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    pool: SqlitePool,
}

impl CurrencyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All currencies ordered by id.
    pub async fn list(&self) -> Result<Vec<Currency>> {
        let rows = sqlx::query_as::<_, CurrencyRow>(
            "SELECT id, code, fullname, sign FROM currencies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Currency::try_from).collect()
    }

    /// Find a currency by code.
    pub async fn find_by_code(&self, code: &CurrencyCode) -> Result<Option<Currency>> {
        let row = sqlx::query_as::<_, CurrencyRow>(
            "SELECT id, code, fullname, sign FROM currencies WHERE code = ?",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Currency::try_from).transpose()
    }

    /// Find a currency by id.
    pub async fn find_by_id(&self, id: CurrencyId) -> Result<Option<Currency>> {
        let row = sqlx::query_as::<_, CurrencyRow>(
            "SELECT id, code, fullname, sign FROM currencies WHERE id = ?",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Currency::try_from).transpose()
    }

    /// Register a currency. Fails with `CurrencyExists` on a duplicate code.
    pub async fn insert(&self, currency: NewCurrency) -> Result<Currency> {
        let result = sqlx::query("INSERT INTO currencies (code, fullname, sign) VALUES (?, ?, ?)")
            .bind(currency.code.as_str())
            .bind(&currency.name)
            .bind(&currency.sign)
            .execute(&self.pool)
            .await;

        let id = match result {
            Ok(done) => CurrencyId::new(done.last_insert_rowid()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!(code = %currency.code, "Duplicate currency code");
                return Err(CurrexError::CurrencyExists(currency.code));
            }
            Err(e) => return Err(db_error(e)),
        };

        info!(id = %id, code = %currency.code, "Currency registered");
        Ok(Currency::new(id, currency.code, currency.name, currency.sign))
    }
}

#[async_trait]
impl CurrencyLookup for CurrencyRepository {
    async fn by_code(&self, code: &CurrencyCode) -> Result<Option<Currency>> {
        self.find_by_code(code).await
    }

    async fn by_id(&self, id: CurrencyId) -> Result<Option<Currency>> {
        self.find_by_id(id).await
    }
}
