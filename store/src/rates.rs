//! Exchange rate repository.

use std::str::FromStr;

use async_trait::async_trait;
use currex_common::{
    Currency, CurrencyId, CurrencyPairCode, CurrexError, RateEdge, RateId, Result,
};
use currex_fx::RateEdgeStore;
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use crate::db::db_error;

#[derive(Debug, sqlx::FromRow)]
struct RateRow {
    id: i64,
    base_currency_id: i64,
    target_currency_id: i64,
    rate: String,
}

impl TryFrom<RateRow> for RateEdge {
    type Error = CurrexError;

    fn try_from(row: RateRow) -> Result<Self> {
        let rate = Decimal::from_str(&row.rate).map_err(|e| {
            CurrexError::DatabaseError(format!("Stored rate {} is not a decimal: {}", row.id, e))
        })?;
        Ok(RateEdge::new(
            RateId::new(row.id),
            CurrencyId::new(row.base_currency_id),
            CurrencyId::new(row.target_currency_id),
            rate,
        ))
    }
}

const SELECT_RATE: &str =
    "SELECT id, base_currency_id, target_currency_id, rate FROM exchange_rates";

/// Reads, inserts and overwrites directed rate edges.
#[derive(Debug, Clone)]
pub struct RateRepository {
    pool: SqlitePool,
}

impl RateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All edges ordered by id.
    pub async fn list(&self) -> Result<Vec<RateEdge>> {
        let rows = sqlx::query_as::<_, RateRow>(&format!("{} ORDER BY id", SELECT_RATE))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(RateEdge::try_from).collect()
    }

    /// The edge for the ordered pair, if stored.
    pub async fn find(&self, base: CurrencyId, target: CurrencyId) -> Result<Option<RateEdge>> {
        let row = sqlx::query_as::<_, RateRow>(&format!(
            "{} WHERE base_currency_id = ? AND target_currency_id = ?",
            SELECT_RATE
        ))
        .bind(base.get())
        .bind(target.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(RateEdge::try_from).transpose()
    }

    /// Store a new edge. Fails with `RateExists` if the ordered pair has one.
    pub async fn insert(&self, base: &Currency, target: &Currency, rate: Decimal) -> Result<RateEdge> {
        let result = sqlx::query(
            "INSERT INTO exchange_rates (base_currency_id, target_currency_id, rate) VALUES (?, ?, ?)",
        )
        .bind(base.id.get())
        .bind(target.id.get())
        .bind(rate.to_string())
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => RateId::new(done.last_insert_rowid()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!(base = %base.code, target = %target.code, "Duplicate rate pair");
                return Err(CurrexError::RateExists(pair_code(base, target)));
            }
            Err(e) => return Err(db_error(e)),
        };

        info!(id = %id, base = %base.code, target = %target.code, rate = %rate, "Rate created");
        Ok(RateEdge::new(id, base.id, target.id, rate))
    }

    /// Overwrite an existing edge. Returns `None` when the pair has no edge.
    pub async fn update(
        &self,
        base: &Currency,
        target: &Currency,
        rate: Decimal,
    ) -> Result<Option<RateEdge>> {
        let done = sqlx::query(
            "UPDATE exchange_rates SET rate = ? WHERE base_currency_id = ? AND target_currency_id = ?",
        )
        .bind(rate.to_string())
        .bind(base.id.get())
        .bind(target.id.get())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if done.rows_affected() == 0 {
            debug!(base = %base.code, target = %target.code, "No rate to update");
            return Ok(None);
        }

        info!(base = %base.code, target = %target.code, rate = %rate, "Rate updated");
        self.find(base.id, target.id).await
    }
}

fn pair_code(base: &Currency, target: &Currency) -> CurrencyPairCode {
    CurrencyPairCode::new(base.code.clone(), target.code.clone())
}

#[async_trait]
impl RateEdgeStore for RateRepository {
    async fn read(&self, base: CurrencyId, target: CurrencyId) -> Result<Option<RateEdge>> {
        self.find(base, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use currex_common::NewCurrency;
    use rust_decimal_macros::dec;

    async fn setup() -> (Database, Currency, Currency) {
        let db = Database::in_memory().await.unwrap();
        db.bootstrap().await.unwrap();
        let currencies = db.currencies();
        let usd = currencies
            .insert(NewCurrency::parse("United States dollar", "USD", "$").unwrap())
            .await
            .unwrap();
        let eur = currencies
            .insert(NewCurrency::parse("Euro", "EUR", "€").unwrap())
            .await
            .unwrap();
        (db, usd, eur)
    }

    #[tokio::test]
    async fn test_insert_and_read_directed() {
        let (db, usd, eur) = setup().await;
        let rates = db.rates();

        let edge = rates.insert(&usd, &eur, dec!(0.91)).await.unwrap();
        assert_eq!(edge.rate, dec!(0.91));

        assert_eq!(rates.read(usd.id, eur.id).await.unwrap(), Some(edge.clone()));
        assert_eq!(rates.read(eur.id, usd.id).await.unwrap(), None);
        assert_eq!(rates.list().await.unwrap(), vec![edge]);
    }

    #[tokio::test]
    async fn test_rate_round_trips_exactly() {
        let (db, usd, eur) = setup().await;
        let rates = db.rates();

        rates.insert(&usd, &eur, dec!(0.123456789012345)).await.unwrap();
        let edge = rates.find(usd.id, eur.id).await.unwrap().unwrap();
        assert_eq!(edge.rate, dec!(0.123456789012345));
    }

    #[tokio::test]
    async fn test_duplicate_pair_rejected() {
        let (db, usd, eur) = setup().await;
        let rates = db.rates();

        rates.insert(&usd, &eur, dec!(0.91)).await.unwrap();
        let err = rates.insert(&usd, &eur, dec!(0.95)).await.unwrap_err();
        assert!(matches!(err, CurrexError::RateExists(_)));

        // The reverse direction is a different pair.
        rates.insert(&eur, &usd, dec!(1.1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_existing_and_missing() {
        let (db, usd, eur) = setup().await;
        let rates = db.rates();

        assert_eq!(rates.update(&usd, &eur, dec!(0.92)).await.unwrap(), None);

        let created = rates.insert(&usd, &eur, dec!(0.91)).await.unwrap();
        let updated = rates.update(&usd, &eur, dec!(0.92)).await.unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.rate, dec!(0.92));
    }
}
