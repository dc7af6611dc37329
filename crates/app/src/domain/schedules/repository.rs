//! Restock Schedule Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use restock::keys::{StockKey, VariantUuid};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::schedules::records::RestockScheduleRecord;

const GET_SCHEDULE_SQL: &str = include_str!("sql/get_schedule.sql");
const SET_EXPECTED_SQL: &str = include_str!("sql/set_expected.sql");
const CLEAR_SCHEDULE_SQL: &str = include_str!("sql/clear_schedule.sql");
const LOCK_EXPIRED_SQL: &str = include_str!("sql/lock_expired.sql");
const EXPIRE_SCHEDULE_SQL: &str = include_str!("sql/expire_schedule.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSchedulesRepository;

impl PgSchedulesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
    ) -> Result<Option<RestockScheduleRecord>, sqlx::Error> {
        query_as::<Postgres, RestockScheduleRecord>(GET_SCHEDULE_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Upsert the expected date. Existing notes are kept when `notes` is `None`.
    pub(crate) async fn set_expected(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
        expected_date: Option<Timestamp>,
        notes: Option<&str>,
    ) -> Result<RestockScheduleRecord, sqlx::Error> {
        query_as::<Postgres, RestockScheduleRecord>(SET_EXPECTED_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_uuid().map(VariantUuid::into_uuid))
            .bind(expected_date.map(SqlxTimestamp::from))
            .bind(notes)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn clear(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
    ) -> Result<RestockScheduleRecord, sqlx::Error> {
        query_as::<Postgres, RestockScheduleRecord>(CLEAR_SCHEDULE_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_uuid().map(VariantUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    /// Schedules whose expected date is before `now`, locked for update.
    pub(crate) async fn lock_expired(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        now: Timestamp,
    ) -> Result<Vec<RestockScheduleRecord>, sqlx::Error> {
        query_as::<Postgres, RestockScheduleRecord>(LOCK_EXPIRED_SQL)
            .bind(SqlxTimestamp::from(now))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn expire(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
        notes: &str,
    ) -> Result<(), sqlx::Error> {
        query(EXPIRE_SCHEDULE_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .bind(notes)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for RestockScheduleRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            key: StockKey::from_storage(row.try_get("product_uuid")?, row.try_get("variant_uuid")?),
            expected_date: row
                .try_get::<Option<SqlxTimestamp>, _>("expected_date")?
                .map(SqlxTimestamp::to_jiff),
            actual_date: row
                .try_get::<Option<SqlxTimestamp>, _>("actual_date")?
                .map(SqlxTimestamp::to_jiff),
            notes: row.try_get("notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
