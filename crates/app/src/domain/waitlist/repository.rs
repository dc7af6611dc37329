//! Waitlist Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use restock::{
    email::EmailAddress,
    keys::{StockKey, VariantUuid},
};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    domain::waitlist::records::{
        CustomerSubscription, Subscriber, SubscriptionRecord, SubscriptionUuid,
    },
    uuids::UserUuid,
};

const FIND_SUBSCRIPTION_SQL: &str = include_str!("sql/find_subscription.sql");
const FIND_ACTIVE_SUBSCRIPTION_SQL: &str = include_str!("sql/find_active_subscription.sql");
const GET_SUBSCRIPTION_SQL: &str = include_str!("sql/get_subscription.sql");
const CREATE_SUBSCRIPTION_SQL: &str = include_str!("sql/create_subscription.sql");
const REACTIVATE_SUBSCRIPTION_SQL: &str = include_str!("sql/reactivate_subscription.sql");
const DEACTIVATE_SUBSCRIPTION_SQL: &str = include_str!("sql/deactivate_subscription.sql");
const IS_SUBSCRIBED_SQL: &str = include_str!("sql/is_subscribed.sql");
const LIST_CUSTOMER_SUBSCRIPTIONS_SQL: &str = include_str!("sql/list_customer_subscriptions.sql");
const LIST_PRODUCT_SUBSCRIBERS_SQL: &str = include_str!("sql/list_product_subscribers.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgWaitlistRepository;

impl PgWaitlistRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Any subscription for `email` on `key`, active or not, locked for update.
    pub(crate) async fn find_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &EmailAddress,
        key: StockKey,
    ) -> Result<Option<SubscriptionRecord>, sqlx::Error> {
        query_as::<Postgres, SubscriptionRecord>(FIND_SUBSCRIPTION_SQL)
            .bind(email.as_str())
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &EmailAddress,
        key: StockKey,
    ) -> Result<Option<SubscriptionRecord>, sqlx::Error> {
        query_as::<Postgres, SubscriptionRecord>(FIND_ACTIVE_SUBSCRIPTION_SQL)
            .bind(email.as_str())
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: SubscriptionUuid,
    ) -> Result<Option<SubscriptionRecord>, sqlx::Error> {
        query_as::<Postgres, SubscriptionRecord>(GET_SUBSCRIPTION_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert a subscription; `None` when one already exists for the same email and key.
    pub(crate) async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &EmailAddress,
        key: StockKey,
        user: Option<UserUuid>,
    ) -> Result<Option<SubscriptionRecord>, sqlx::Error> {
        query_as::<Postgres, SubscriptionRecord>(CREATE_SUBSCRIPTION_SQL)
            .bind(SubscriptionUuid::new().into_uuid())
            .bind(email.as_str())
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_uuid().map(VariantUuid::into_uuid))
            .bind(user.map(UserUuid::into_uuid))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn reactivate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: SubscriptionUuid,
        user: Option<UserUuid>,
    ) -> Result<SubscriptionRecord, sqlx::Error> {
        query_as::<Postgres, SubscriptionRecord>(REACTIVATE_SUBSCRIPTION_SQL)
            .bind(uuid.into_uuid())
            .bind(user.map(UserUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    /// Deactivate the active subscription, returning whether one was found.
    pub(crate) async fn deactivate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &EmailAddress,
        key: StockKey,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(DEACTIVATE_SUBSCRIPTION_SQL)
            .bind(email.as_str())
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub(crate) async fn is_subscribed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &EmailAddress,
        key: StockKey,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(IS_SUBSCRIBED_SQL)
            .bind(email.as_str())
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_for_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &EmailAddress,
    ) -> Result<Vec<CustomerSubscription>, sqlx::Error> {
        query_as::<Postgres, CustomerSubscription>(LIST_CUSTOMER_SUBSCRIPTIONS_SQL)
            .bind(email.as_str())
            .fetch_all(&mut **tx)
            .await
    }

    /// Active subscribers for `key`, oldest first.
    pub(crate) async fn list_for_key(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
    ) -> Result<Vec<Subscriber>, sqlx::Error> {
        query_as::<Postgres, Subscriber>(LIST_PRODUCT_SUBSCRIBERS_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .fetch_all(&mut **tx)
            .await
    }
}

pub(crate) fn try_get_email(row: &PgRow, col: &str) -> Result<EmailAddress, sqlx::Error> {
    let email: String = row.try_get(col)?;

    EmailAddress::parse(&email).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

fn try_get_user(row: &PgRow) -> Result<Option<UserUuid>, sqlx::Error> {
    Ok(row
        .try_get::<Option<Uuid>, _>("user_uuid")?
        .map(UserUuid::from_uuid))
}

impl<'r> FromRow<'r, PgRow> for SubscriptionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SubscriptionUuid::from_uuid(row.try_get("uuid")?),
            email: try_get_email(row, "email")?,
            key: StockKey::from_storage(row.try_get("product_uuid")?, row.try_get("variant_uuid")?),
            user: try_get_user(row)?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CustomerSubscription {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            subscription: SubscriptionRecord::from_row(row)?,
            product_name: row.try_get("product_name")?,
            variant_name: row.try_get("variant_name")?,
            expected_restock_date: row
                .try_get::<Option<SqlxTimestamp>, _>("expected_restock_date")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Subscriber {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SubscriptionUuid::from_uuid(row.try_get("uuid")?),
            email: try_get_email(row, "email")?,
            user: try_get_user(row)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
