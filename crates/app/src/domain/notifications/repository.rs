//! Notification Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use restock::funnel::FunnelCounts;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    notifications::records::{Engagement, NotificationUuid, RestockNotificationRecord},
    stock::repository::try_get_amount,
    waitlist::records::SubscriptionUuid,
};

const CREATE_NOTIFICATION_SQL: &str = include_str!("sql/create_notification.sql");
const TRACK_OPEN_SQL: &str = include_str!("sql/track_open.sql");
const TRACK_CLICK_SQL: &str = include_str!("sql/track_click.sql");
const TRACK_PURCHASE_SQL: &str = include_str!("sql/track_purchase.sql");
const FUNNEL_COUNTS_SQL: &str = include_str!("sql/funnel_counts.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgNotificationsRepository;

impl PgNotificationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        subscription: SubscriptionUuid,
        reservation_token: &str,
        reservation_expires_at: Timestamp,
    ) -> Result<RestockNotificationRecord, sqlx::Error> {
        query_as::<Postgres, RestockNotificationRecord>(CREATE_NOTIFICATION_SQL)
            .bind(NotificationUuid::new().into_uuid())
            .bind(subscription.into_uuid())
            .bind(reservation_token)
            .bind(SqlxTimestamp::from(reservation_expires_at))
            .fetch_one(&mut **tx)
            .await
    }

    /// Flip the flag for `engagement` (and the steps before it) on.
    pub(crate) async fn track(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        notification: NotificationUuid,
        engagement: Engagement,
    ) -> Result<RestockNotificationRecord, sqlx::Error> {
        let sql = match engagement {
            Engagement::Opened => TRACK_OPEN_SQL,
            Engagement::Clicked => TRACK_CLICK_SQL,
            Engagement::Purchased => TRACK_PURCHASE_SQL,
        };

        query_as::<Postgres, RestockNotificationRecord>(sql)
            .bind(notification.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn funnel_counts(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<FunnelCounts, sqlx::Error> {
        let row = query(FUNNEL_COUNTS_SQL).fetch_one(&mut **tx).await?;

        Ok(FunnelCounts {
            total_sent: try_get_amount(&row, "total_sent")?,
            opened: try_get_amount(&row, "opened")?,
            clicked: try_get_amount(&row, "clicked")?,
            purchased: try_get_amount(&row, "purchased")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for RestockNotificationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: NotificationUuid::from_uuid(row.try_get("uuid")?),
            subscription: SubscriptionUuid::from_uuid(row.try_get("subscription_uuid")?),
            sent_at: row.try_get::<SqlxTimestamp, _>("sent_at")?.to_jiff(),
            email_opened: row.try_get("email_opened")?,
            link_clicked: row.try_get("link_clicked")?,
            purchase_completed: row.try_get("purchase_completed")?,
            reservation_token: row.try_get("reservation_token")?,
            reservation_expires_at: row
                .try_get::<SqlxTimestamp, _>("reservation_expires_at")?
                .to_jiff(),
        })
    }
}
