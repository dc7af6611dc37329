//! Stock Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use restock::keys::{StockKey, VariantUuid};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::stock::records::StockRecord;

const GET_STOCK_SQL: &str = include_str!("sql/get_stock.sql");
const LOCK_STOCK_SQL: &str = include_str!("sql/lock_stock.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const INCREMENT_STOCK_SQL: &str = include_str!("sql/increment_stock.sql");
const SET_STOCK_SQL: &str = include_str!("sql/set_stock.sql");
const SET_ACTIVE_SQL: &str = include_str!("sql/set_active.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgStockRepository;

impl PgStockRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
    ) -> Result<Option<StockRecord>, sqlx::Error> {
        query_as::<Postgres, StockRecord>(GET_STOCK_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Fetch the stock row for `key` and hold its lock until the transaction ends.
    pub(crate) async fn lock_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
    ) -> Result<Option<StockRecord>, sqlx::Error> {
        query_as::<Postgres, StockRecord>(LOCK_STOCK_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Remove `quantity` units; `None` when fewer than `quantity` are available.
    pub(crate) async fn decrement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
        quantity: u64,
    ) -> Result<Option<u64>, sqlx::Error> {
        let remaining: Option<i64> = query_scalar(DECREMENT_STOCK_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .bind(to_amount(quantity, "quantity_available")?)
            .fetch_optional(&mut **tx)
            .await?;

        remaining
            .map(|remaining| from_amount(remaining, "quantity_available"))
            .transpose()
    }

    /// Add `quantity` units, creating the record if needed. Returns the new level.
    pub(crate) async fn increment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
        quantity: u64,
    ) -> Result<u64, sqlx::Error> {
        let current: i64 = query_scalar(INCREMENT_STOCK_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_uuid().map(VariantUuid::into_uuid))
            .bind(to_amount(quantity, "quantity_available")?)
            .fetch_one(&mut **tx)
            .await?;

        from_amount(current, "quantity_available")
    }

    pub(crate) async fn set_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
        quantity: u64,
    ) -> Result<StockRecord, sqlx::Error> {
        query_as::<Postgres, StockRecord>(SET_STOCK_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_uuid().map(VariantUuid::into_uuid))
            .bind(to_amount(quantity, "quantity_available")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
        active: bool,
    ) -> Result<StockRecord, sqlx::Error> {
        query_as::<Postgres, StockRecord>(SET_ACTIVE_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .bind(active)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for StockRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            key: StockKey::from_storage(row.try_get("product_uuid")?, row.try_get("variant_uuid")?),
            quantity_available: try_get_amount(row, "quantity_available")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    from_amount(amount_i64, col)
}

pub(crate) fn from_amount(amount: i64, col: &str) -> Result<u64, sqlx::Error> {
    u64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn to_amount(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
