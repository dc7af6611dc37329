//! Waitlist service.

use async_trait::async_trait;
use mockall::automock;
use restock::{email::EmailAddress, keys::StockKey};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        catalog::repository::PgCatalogRepository,
        waitlist::{
            data::NewSubscription,
            errors::WaitlistServiceError,
            records::{CustomerSubscription, Subscribed, Subscriber, SubscriptionRecord, SubscriptionUuid},
            repository::PgWaitlistRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgWaitlistService {
    db: Db,
    repository: PgWaitlistRepository,
    catalog: PgCatalogRepository,
}

impl PgWaitlistService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgWaitlistRepository::new(),
            catalog: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl WaitlistService for PgWaitlistService {
    #[tracing::instrument(
        name = "waitlist.service.subscribe",
        skip(self, subscription),
        fields(key = %subscription.key),
        err
    )]
    async fn subscribe(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscribed, WaitlistServiceError> {
        let email = EmailAddress::parse(&subscription.email)?;
        let key = subscription.key;

        let mut tx = self.db.begin_transaction().await?;

        if !self.catalog.exists(&mut tx, key).await? {
            return Err(WaitlistServiceError::UnknownItem(key));
        }

        let subscribed = match self.repository.find_for_update(&mut tx, &email, key).await? {
            Some(existing) if existing.is_active => {
                return Err(WaitlistServiceError::AlreadySubscribed);
            }
            Some(existing) => Subscribed::Reactivated(
                self.repository
                    .reactivate(&mut tx, existing.uuid, subscription.user)
                    .await?,
            ),
            None => Subscribed::Created(
                self.repository
                    .create(&mut tx, &email, key, subscription.user)
                    .await?
                    .ok_or(WaitlistServiceError::AlreadySubscribed)?,
            ),
        };

        tx.commit().await?;

        match &subscribed {
            Subscribed::Created(record) => {
                info!(subscription_uuid = %record.uuid, "created waitlist subscription");
            }
            Subscribed::Reactivated(record) => {
                info!(subscription_uuid = %record.uuid, "reactivated waitlist subscription");
            }
        }

        Ok(subscribed)
    }

    #[tracing::instrument(
        name = "waitlist.service.unsubscribe",
        skip(self, email, key),
        fields(key = %key),
        err
    )]
    async fn unsubscribe(&self, email: &str, key: StockKey) -> Result<(), WaitlistServiceError> {
        let email = EmailAddress::parse(email)?;

        let mut tx = self.db.begin_transaction().await?;

        if !self.repository.deactivate(&mut tx, &email, key).await? {
            return Err(WaitlistServiceError::NotFound);
        }

        tx.commit().await?;

        info!("deactivated waitlist subscription");

        Ok(())
    }

    async fn is_subscribed(&self, email: &str, key: StockKey) -> Result<bool, WaitlistServiceError> {
        let email = EmailAddress::parse(email)?;

        let mut tx = self.db.begin_transaction().await?;

        let subscribed = self.repository.is_subscribed(&mut tx, &email, key).await?;

        tx.commit().await?;

        Ok(subscribed)
    }

    async fn get_subscription(
        &self,
        subscription: SubscriptionUuid,
    ) -> Result<SubscriptionRecord, WaitlistServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .repository
            .get(&mut tx, subscription)
            .await?
            .ok_or(WaitlistServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    async fn find_active(
        &self,
        email: &EmailAddress,
        key: StockKey,
    ) -> Result<Option<SubscriptionRecord>, WaitlistServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.repository.find_active(&mut tx, email, key).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(name = "waitlist.service.list_for_customer", skip(self, email), err)]
    async fn list_for_customer(
        &self,
        email: &str,
    ) -> Result<Vec<CustomerSubscription>, WaitlistServiceError> {
        let email = EmailAddress::parse(email)?;

        let mut tx = self.db.begin_transaction().await?;

        let subscriptions = self.repository.list_for_customer(&mut tx, &email).await?;

        tx.commit().await?;

        Ok(subscriptions)
    }

    #[tracing::instrument(
        name = "waitlist.service.list_for_product",
        skip(self, key),
        fields(key = %key),
        err
    )]
    async fn list_for_product(&self, key: StockKey) -> Result<Vec<Subscriber>, WaitlistServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let subscribers = self.repository.list_for_key(&mut tx, key).await?;

        tx.commit().await?;

        Ok(subscribers)
    }
}

#[automock]
#[async_trait]
pub trait WaitlistService: Send + Sync {
    /// Subscribes an email address to restock notices for a product or variant.
    ///
    /// A previously cancelled subscription is reactivated and keeps its original creation time.
    async fn subscribe(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscribed, WaitlistServiceError>;

    /// Deactivates an active subscription.
    async fn unsubscribe(&self, email: &str, key: StockKey) -> Result<(), WaitlistServiceError>;

    /// Whether an active subscription exists.
    async fn is_subscribed(&self, email: &str, key: StockKey) -> Result<bool, WaitlistServiceError>;

    async fn get_subscription(
        &self,
        subscription: SubscriptionUuid,
    ) -> Result<SubscriptionRecord, WaitlistServiceError>;

    /// The active subscription for an email address and key, if any.
    async fn find_active(
        &self,
        email: &EmailAddress,
        key: StockKey,
    ) -> Result<Option<SubscriptionRecord>, WaitlistServiceError>;

    /// Active subscriptions for a customer, oldest first.
    async fn list_for_customer(
        &self,
        email: &str,
    ) -> Result<Vec<CustomerSubscription>, WaitlistServiceError>;

    /// Active subscribers waiting on a key, oldest first.
    async fn list_for_product(&self, key: StockKey) -> Result<Vec<Subscriber>, WaitlistServiceError>;
}

#[cfg(test)]
mod tests {
    use restock::{email::EmailError, keys::ProductUuid};
    use testresult::TestResult;

    use crate::{domain::schedules::SchedulesService, test::TestContext, uuids::UserUuid};

    use super::*;

    fn subscription(email: &str, key: StockKey) -> NewSubscription {
        NewSubscription {
            email: email.to_string(),
            key,
            user: None,
        }
    }

    #[tokio::test]
    async fn subscribe_normalises_email_and_creates_subscription() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let key = StockKey::product(product);

        let subscribed = ctx
            .waitlist
            .subscribe(subscription("  Ada@Example.COM ", key))
            .await?;

        let Subscribed::Created(record) = subscribed else {
            panic!("expected a new subscription, got {subscribed:?}");
        };

        assert_eq!(record.email.as_str(), "ada@example.com");
        assert_eq!(record.key, key);
        assert!(record.is_active);
        assert!(ctx.waitlist.is_subscribed("ada@example.com", key).await?);

        Ok(())
    }

    #[tokio::test]
    async fn subscribe_twice_returns_already_subscribed() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let key = StockKey::product(product);

        ctx.waitlist
            .subscribe(subscription("ada@example.com", key))
            .await?;

        let result = ctx
            .waitlist
            .subscribe(subscription("ADA@example.com", key))
            .await;

        assert!(
            matches!(result, Err(WaitlistServiceError::AlreadySubscribed)),
            "expected AlreadySubscribed, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn resubscribe_after_unsubscribe_reactivates_same_row() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let key = StockKey::product(product);

        let first = ctx
            .waitlist
            .subscribe(subscription("ada@example.com", key))
            .await?
            .into_record();

        ctx.waitlist.unsubscribe("ada@example.com", key).await?;

        assert!(!ctx.waitlist.is_subscribed("ada@example.com", key).await?);

        let second = ctx
            .waitlist
            .subscribe(subscription("ada@example.com", key))
            .await?;

        let Subscribed::Reactivated(record) = second else {
            panic!("expected reactivation, got {second:?}");
        };

        assert_eq!(record.uuid, first.uuid);
        assert_eq!(record.created_at, first.created_at);
        assert!(record.is_active);

        Ok(())
    }

    #[tokio::test]
    async fn unsubscribe_inactive_subscription_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let key = StockKey::product(product);

        ctx.waitlist
            .subscribe(subscription("ada@example.com", key))
            .await?;
        ctx.waitlist.unsubscribe("ada@example.com", key).await?;

        let result = ctx.waitlist.unsubscribe("ada@example.com", key).await;

        assert!(
            matches!(result, Err(WaitlistServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn subscribe_rejects_invalid_email() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;

        let result = ctx
            .waitlist
            .subscribe(subscription("not-an-email", StockKey::product(product)))
            .await;

        assert!(
            matches!(
                result,
                Err(WaitlistServiceError::InvalidEmail(EmailError::MissingAt))
            ),
            "expected InvalidEmail, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn subscribe_rejects_unknown_item() {
        let ctx = TestContext::new().await;
        let key = StockKey::product(ProductUuid::new());

        let result = ctx
            .waitlist
            .subscribe(subscription("ada@example.com", key))
            .await;

        assert!(
            matches!(result, Err(WaitlistServiceError::UnknownItem(k)) if k == key),
            "expected UnknownItem, got {result:?}"
        );
    }

    #[tokio::test]
    async fn subscribe_rejects_variant_of_another_product() -> TestResult {
        let ctx = TestContext::new().await;
        let boots = ctx.create_product("Trail Boot").await?;
        let scarf = ctx.create_product("Wool Scarf").await?;
        let variant = ctx.create_variant(boots, "Size 42").await?;

        let result = ctx
            .waitlist
            .subscribe(subscription(
                "ada@example.com",
                StockKey::variant(scarf, variant),
            ))
            .await;

        assert!(
            matches!(result, Err(WaitlistServiceError::UnknownItem(_))),
            "expected UnknownItem, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn product_and_variant_subscriptions_are_independent() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let variant = ctx.create_variant(product, "Size 42").await?;

        ctx.waitlist
            .subscribe(subscription("ada@example.com", StockKey::product(product)))
            .await?;
        ctx.waitlist
            .subscribe(subscription(
                "ada@example.com",
                StockKey::variant(product, variant),
            ))
            .await?;

        let subscriptions = ctx.waitlist.list_for_customer("ada@example.com").await?;

        assert_eq!(subscriptions.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn same_user_with_different_emails_is_tracked_independently() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let key = StockKey::product(product);
        let user = UserUuid::new();

        for email in ["ada@example.com", "ada@work.example"] {
            ctx.waitlist
                .subscribe(NewSubscription {
                    email: email.to_string(),
                    key,
                    user: Some(user),
                })
                .await?;
        }

        let subscribers = ctx.waitlist.list_for_product(key).await?;

        assert_eq!(subscribers.len(), 2);
        assert!(subscribers.iter().all(|s| s.user == Some(user)));

        Ok(())
    }

    #[tokio::test]
    async fn list_for_customer_includes_names_and_expected_date() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let variant = ctx.create_variant(product, "Size 42").await?;
        let key = StockKey::variant(product, variant);
        let expected = ctx.future_date(14)?;

        ctx.schedules.set_expected(key, Some(expected), None).await?;
        ctx.waitlist
            .subscribe(subscription("ada@example.com", key))
            .await?;

        let subscriptions = ctx.waitlist.list_for_customer("ada@example.com").await?;

        assert_eq!(subscriptions.len(), 1);

        let entry = &subscriptions[0];

        assert_eq!(entry.product_name, "Trail Boot");
        assert_eq!(entry.variant_name.as_deref(), Some("Size 42"));
        assert_eq!(entry.expected_restock_date, Some(expected));

        Ok(())
    }

    #[tokio::test]
    async fn list_for_product_returns_active_subscribers_oldest_first() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let key = StockKey::product(product);

        for email in ["first@example.com", "second@example.com", "third@example.com"] {
            ctx.waitlist.subscribe(subscription(email, key)).await?;
        }

        ctx.waitlist.unsubscribe("second@example.com", key).await?;

        let subscribers = ctx.waitlist.list_for_product(key).await?;
        let emails: Vec<&str> = subscribers.iter().map(|s| s.email.as_str()).collect();

        assert_eq!(emails, ["first@example.com", "third@example.com"]);

        Ok(())
    }
}
