//! Restock schedule service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use restock::{
    keys::StockKey,
    schedule::{append_note, expiry_note, is_expired, validate_expected_date},
};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        catalog::repository::PgCatalogRepository,
        schedules::{
            errors::SchedulesServiceError,
            records::{ExpiredSchedule, RestockScheduleRecord, SweepReport},
            repository::PgSchedulesRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgSchedulesService {
    db: Db,
    repository: PgSchedulesRepository,
    catalog: PgCatalogRepository,
}

impl PgSchedulesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgSchedulesRepository::new(),
            catalog: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl SchedulesService for PgSchedulesService {
    #[tracing::instrument(
        name = "schedules.service.set_expected",
        skip(self, key, notes),
        fields(key = %key),
        err
    )]
    async fn set_expected(
        &self,
        key: StockKey,
        expected_date: Option<Timestamp>,
        notes: Option<String>,
    ) -> Result<RestockScheduleRecord, SchedulesServiceError> {
        let expected_date = expected_date
            .map(|date| validate_expected_date(date, Timestamp::now()))
            .transpose()?;

        let mut tx = self.db.begin_transaction().await?;

        if !self.catalog.exists(&mut tx, key).await? {
            return Err(SchedulesServiceError::UnknownItem(key));
        }

        let schedule = self
            .repository
            .set_expected(&mut tx, key, expected_date, notes.as_deref())
            .await?;

        tx.commit().await?;

        info!(expected_date = ?schedule.expected_date, "set expected restock date");

        Ok(schedule)
    }

    async fn get_expected(&self, key: StockKey) -> Result<Option<Timestamp>, SchedulesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let schedule = self.repository.get(&mut tx, key).await?;

        tx.commit().await?;

        Ok(schedule.and_then(|schedule| schedule.expected_date))
    }

    async fn get_schedule(
        &self,
        key: StockKey,
    ) -> Result<RestockScheduleRecord, SchedulesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let schedule = self
            .repository
            .get(&mut tx, key)
            .await?
            .ok_or(SchedulesServiceError::NotFound)?;

        tx.commit().await?;

        Ok(schedule)
    }

    #[tracing::instrument(name = "schedules.service.clear", skip(self, key), fields(key = %key), err)]
    async fn clear(&self, key: StockKey) -> Result<RestockScheduleRecord, SchedulesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let schedule = self.repository.clear(&mut tx, key).await?;

        tx.commit().await?;

        info!("cleared restock schedule");

        Ok(schedule)
    }

    #[tracing::instrument(name = "schedules.service.sweep_expired", skip(self), err)]
    async fn sweep_expired(&self) -> Result<SweepReport, SchedulesServiceError> {
        let now = Timestamp::now();

        let mut tx = self.db.begin_transaction().await?;

        let candidates = self.repository.lock_expired(&mut tx, now).await?;
        let mut expired = Vec::with_capacity(candidates.len());

        for schedule in candidates {
            let Some(expected_date) = schedule
                .expected_date
                .filter(|&date| is_expired(date, now))
            else {
                continue;
            };

            let notes = append_note(schedule.notes.as_deref(), &expiry_note(expected_date));

            self.repository.expire(&mut tx, schedule.key, &notes).await?;

            expired.push(ExpiredSchedule {
                key: schedule.key,
                expected_date,
            });
        }

        tx.commit().await?;

        info!(expired_count = expired.len(), "swept expired restock schedules");

        Ok(SweepReport { expired })
    }
}

#[automock]
#[async_trait]
pub trait SchedulesService: Send + Sync {
    /// Sets or clears the expected restock date for a product or variant.
    ///
    /// Dates must lie in the future. Existing notes are kept unless new ones are given.
    async fn set_expected(
        &self,
        key: StockKey,
        expected_date: Option<Timestamp>,
        notes: Option<String>,
    ) -> Result<RestockScheduleRecord, SchedulesServiceError>;

    /// The expected restock date, if one is set.
    async fn get_expected(&self, key: StockKey) -> Result<Option<Timestamp>, SchedulesServiceError>;

    async fn get_schedule(
        &self,
        key: StockKey,
    ) -> Result<RestockScheduleRecord, SchedulesServiceError>;

    /// Records an actual restock: the expected date is cleared and the actual date set to now.
    async fn clear(&self, key: StockKey) -> Result<RestockScheduleRecord, SchedulesServiceError>;

    /// Clears every expected date that has passed, appending an explanatory note.
    async fn sweep_expired(&self) -> Result<SweepReport, SchedulesServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use restock::{keys::ProductUuid, schedule::ScheduleError};
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn set_expected_stores_future_date() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let key = StockKey::product(product);
        let expected = ctx.future_date(7)?;

        ctx.schedules
            .set_expected(key, Some(expected), Some("supplier confirmed".to_string()))
            .await?;

        assert_eq!(ctx.schedules.get_expected(key).await?, Some(expected));

        let schedule = ctx.schedules.get_schedule(key).await?;

        assert_eq!(schedule.notes.as_deref(), Some("supplier confirmed"));
        assert_eq!(schedule.actual_date, None);

        Ok(())
    }

    #[tokio::test]
    async fn set_expected_rejects_past_date() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let yesterday = Timestamp::now().checked_sub(SignedDuration::from_hours(24))?;

        let result = ctx
            .schedules
            .set_expected(StockKey::product(product), Some(yesterday), None)
            .await;

        assert!(
            matches!(
                result,
                Err(SchedulesServiceError::InvalidDate(ScheduleError::NotInFuture { .. }))
            ),
            "expected InvalidDate, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn set_expected_rejects_unknown_item() {
        let ctx = TestContext::new().await;

        let result = ctx
            .schedules
            .set_expected(StockKey::product(ProductUuid::new()), None, None)
            .await;

        assert!(
            matches!(result, Err(SchedulesServiceError::UnknownItem(_))),
            "expected UnknownItem, got {result:?}"
        );
    }

    #[tokio::test]
    async fn set_expected_none_clears_date_and_keeps_notes() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let key = StockKey::product(product);

        ctx.schedules
            .set_expected(key, Some(ctx.future_date(7)?), Some("container delayed".to_string()))
            .await?;
        ctx.schedules.set_expected(key, None, None).await?;

        let schedule = ctx.schedules.get_schedule(key).await?;

        assert_eq!(schedule.expected_date, None);
        assert_eq!(schedule.notes.as_deref(), Some("container delayed"));

        Ok(())
    }

    #[tokio::test]
    async fn get_expected_without_schedule_is_none() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;

        assert_eq!(
            ctx.schedules.get_expected(StockKey::product(product)).await?,
            None
        );

        Ok(())
    }

    #[tokio::test]
    async fn clear_sets_actual_date_and_creates_missing_schedule() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let variant = ctx.create_variant(product, "Size 42").await?;
        let scheduled = StockKey::product(product);
        let unscheduled = StockKey::variant(product, variant);

        ctx.schedules
            .set_expected(scheduled, Some(ctx.future_date(7)?), None)
            .await?;

        for key in [scheduled, unscheduled] {
            let schedule = ctx.schedules.clear(key).await?;

            assert_eq!(schedule.expected_date, None);
            assert!(schedule.actual_date.is_some());
        }

        Ok(())
    }

    #[tokio::test]
    async fn sweep_expires_passed_dates_once() -> TestResult {
        let ctx = TestContext::new().await;
        let late = ctx.create_product("Trail Boot").await?;
        let on_time = ctx.create_product("Wool Scarf").await?;
        let late_key = StockKey::product(late);

        ctx.schedules
            .set_expected(late_key, Some(ctx.future_date(7)?), Some("supplier delay".to_string()))
            .await?;
        ctx.schedules
            .set_expected(StockKey::product(on_time), Some(ctx.future_date(7)?), None)
            .await?;

        let passed: Timestamp = "2026-03-01T00:00:00Z".parse()?;
        ctx.backdate_schedule(late_key, passed).await?;

        let report = ctx.schedules.sweep_expired().await?;

        assert_eq!(report.expired_count(), 1);
        assert_eq!(report.expired[0].key, late_key);
        assert_eq!(report.expired[0].expected_date, passed);

        let schedule = ctx.schedules.get_schedule(late_key).await?;

        assert_eq!(schedule.expected_date, None);
        assert_eq!(
            schedule.notes.as_deref(),
            Some("supplier delay\nExpected restock date 2026-03-01 passed without a restock")
        );

        assert_eq!(ctx.schedules.sweep_expired().await?.expired_count(), 0);

        Ok(())
    }
}
