//! Notification service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use restock::{email::EmailAddress, funnel::FunnelRates, keys::StockKey};
use rustc_hash::FxHashSet;
use sqlx::{Postgres, Transaction};
use tracing::{error, info};

use crate::{
    database::Db,
    domain::{
        backorders::records::{BackorderRecord, BackorderUuid},
        catalog::repository::PgCatalogRepository,
        notifications::{
            errors::NotificationsServiceError,
            messages::{
                RestockLine, consolidated_restock_notice, delay_notice, fulfillment_notice,
                restock_notice,
            },
            records::{Engagement, NotificationUuid, RestockNotificationRecord},
            repository::PgNotificationsRepository,
            settings::NotificationSettings,
            tokens::reservation_token,
            transport::MailTransport,
        },
        waitlist::{
            records::{SubscriptionRecord, SubscriptionUuid},
            repository::PgWaitlistRepository,
        },
    },
};

/// A restock notice prepared for one subscription, waiting to be delivered.
struct PreparedNotice {
    subscription: SubscriptionUuid,
    token: String,
    line: RestockLine,
}

#[derive(Clone)]
pub struct PgNotificationsService {
    db: Db,
    transport: Arc<dyn MailTransport>,
    settings: NotificationSettings,
    repository: PgNotificationsRepository,
    waitlist: PgWaitlistRepository,
    catalog: PgCatalogRepository,
}

impl PgNotificationsService {
    #[must_use]
    pub fn new(db: Db, transport: Arc<dyn MailTransport>, settings: NotificationSettings) -> Self {
        Self {
            db,
            transport,
            settings,
            repository: PgNotificationsRepository::new(),
            waitlist: PgWaitlistRepository::new(),
            catalog: PgCatalogRepository::new(),
        }
    }

    fn purchase_link(&self, key: StockKey, token: &str) -> String {
        let base = self.settings.storefront_url();
        let product = key.product_uuid();

        match key.variant_uuid() {
            Some(variant) => {
                format!("{base}/products/{product}?variant={variant}&reservation={token}")
            }
            None => format!("{base}/products/{product}?reservation={token}"),
        }
    }

    fn order_link(&self, order: BackorderUuid) -> String {
        format!("{}/backorders/{order}", self.settings.storefront_url())
    }

    async fn prepare(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        subscription: &SubscriptionRecord,
    ) -> Result<PreparedNotice, NotificationsServiceError> {
        let item = self
            .catalog
            .describe(tx, subscription.key)
            .await?
            .ok_or(NotificationsServiceError::UnknownItem(subscription.key))?;

        let token = reservation_token();

        Ok(PreparedNotice {
            subscription: subscription.uuid,
            line: RestockLine {
                name: item.display_name(),
                purchase_link: self.purchase_link(subscription.key, &token),
            },
            token,
        })
    }

    /// Store one record per delivered notice.
    /// Store records for notices that have already been delivered.
    async fn record(
        &self,
        notices: &[PreparedNotice],
        sent_at: Timestamp,
    ) -> Result<Vec<RestockNotificationRecord>, NotificationsServiceError> {
        self.try_record(notices, sent_at).await.map_err(|source| {
            error!(
                %source,
                notices = notices.len(),
                "restock notification delivered but not recorded"
            );

            NotificationsServiceError::Unrecorded {
                subscriptions: notices.iter().map(|notice| notice.subscription).collect(),
                source: Box::new(source),
            }
        })
    }

    async fn try_record(
        &self,
        notices: &[PreparedNotice],
        sent_at: Timestamp,
    ) -> Result<Vec<RestockNotificationRecord>, NotificationsServiceError> {
        let expires_at = sent_at.checked_add(self.settings.reservation_window())?;

        let mut tx = self.db.begin_transaction().await?;
        let mut records = Vec::with_capacity(notices.len());

        for notice in notices {
            records.push(
                self.repository
                    .create(&mut tx, notice.subscription, &notice.token, expires_at)
                    .await?,
            );
        }

        tx.commit().await?;

        Ok(records)
    }

    /// Display names for an order's lines, one per distinct key.
    async fn item_names(&self, order: &BackorderRecord) -> Result<Vec<String>, NotificationsServiceError> {
        let mut tx = self.db.begin_transaction().await?;
        let mut seen = FxHashSet::default();
        let mut names = Vec::new();

        for item in &order.items {
            if !seen.insert(item.key) {
                continue;
            }

            let description = self
                .catalog
                .describe(&mut tx, item.key)
                .await?
                .ok_or(NotificationsServiceError::UnknownItem(item.key))?;

            names.push(description.display_name());
        }

        tx.commit().await?;

        Ok(names)
    }

    async fn track(
        &self,
        notification: NotificationUuid,
        engagement: Engagement,
    ) -> Result<RestockNotificationRecord, NotificationsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .repository
            .track(&mut tx, notification, engagement)
            .await?;

        tx.commit().await?;

        Ok(record)
    }
}

#[async_trait]
impl NotificationsService for PgNotificationsService {
    #[tracing::instrument(
        name = "notifications.service.send_restock",
        skip(self, subscription),
        fields(subscription_uuid = %subscription),
        err
    )]
    async fn send_restock(
        &self,
        subscription: SubscriptionUuid,
    ) -> Result<RestockNotificationRecord, NotificationsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .waitlist
            .get(&mut tx, subscription)
            .await?
            .ok_or(NotificationsServiceError::SubscriptionNotFound)?;

        if !record.is_active {
            return Err(NotificationsServiceError::InactiveSubscription);
        }

        let notice = self.prepare(&mut tx, &record).await?;

        tx.commit().await?;

        let sent_at = Timestamp::now();

        self.transport
            .send(restock_notice(
                record.email,
                &notice.line,
                self.settings.reservation_minutes(),
            ))
            .await?;

        let mut records = self.record(&[notice], sent_at).await?;
        let sent = records
            .pop()
            .ok_or(NotificationsServiceError::MissingRequiredData)?;

        info!(notification_uuid = %sent.uuid, "sent restock notification");

        Ok(sent)
    }

    #[tracing::instrument(
        name = "notifications.service.send_consolidated",
        skip(self, email, keys),
        fields(item_count = keys.len()),
        err
    )]
    async fn send_consolidated(
        &self,
        email: EmailAddress,
        keys: Vec<StockKey>,
    ) -> Result<Vec<RestockNotificationRecord>, NotificationsServiceError> {
        let mut seen = FxHashSet::default();
        let keys: Vec<StockKey> = keys.into_iter().filter(|key| seen.insert(*key)).collect();

        let mut tx = self.db.begin_transaction().await?;

        if let [key] = keys.as_slice() {
            let subscription = self
                .waitlist
                .find_active(&mut tx, &email, *key)
                .await?
                .ok_or(NotificationsServiceError::SubscriptionNotFound)?;

            tx.commit().await?;

            return Ok(vec![self.send_restock(subscription.uuid).await?]);
        }

        let mut notices = Vec::with_capacity(keys.len());

        for key in keys {
            if let Some(subscription) = self.waitlist.find_active(&mut tx, &email, key).await? {
                notices.push(self.prepare(&mut tx, &subscription).await?);
            }
        }

        tx.commit().await?;

        if notices.is_empty() {
            return Ok(Vec::new());
        }

        let sent_at = Timestamp::now();
        let minutes = self.settings.reservation_minutes();

        let message = match notices.as_slice() {
            [notice] => restock_notice(email, &notice.line, minutes),
            _ => {
                let lines: Vec<RestockLine> =
                    notices.iter().map(|notice| notice.line.clone()).collect();

                consolidated_restock_notice(email, &lines, minutes)
            }
        };

        self.transport.send(message).await?;

        let records = self.record(&notices, sent_at).await?;

        info!(notifications = records.len(), "sent consolidated restock notification");

        Ok(records)
    }

    #[tracing::instrument(
        name = "notifications.service.send_delay",
        skip(self, order, expected),
        fields(backorder_uuid = %order.uuid),
        err
    )]
    async fn send_delay(
        &self,
        order: BackorderRecord,
        expected: Option<Timestamp>,
    ) -> Result<(), NotificationsServiceError> {
        let names = self.item_names(&order).await?;
        let order_link = self.order_link(order.uuid);
        let cancel_link = format!("{order_link}/cancel");

        self.transport
            .send(delay_notice(
                order.email,
                &names,
                expected,
                &order_link,
                &cancel_link,
            ))
            .await?;

        info!("sent backorder delay notification");

        Ok(())
    }

    #[tracing::instrument(
        name = "notifications.service.send_fulfillment",
        skip(self, order),
        fields(backorder_uuid = %order.uuid),
        err
    )]
    async fn send_fulfillment(&self, order: BackorderRecord) -> Result<(), NotificationsServiceError> {
        let names = self.item_names(&order).await?;
        let order_link = self.order_link(order.uuid);

        self.transport
            .send(fulfillment_notice(order.email, &names, &order_link))
            .await?;

        info!("sent backorder fulfillment notification");

        Ok(())
    }

    async fn track_open(
        &self,
        notification: NotificationUuid,
    ) -> Result<RestockNotificationRecord, NotificationsServiceError> {
        self.track(notification, Engagement::Opened).await
    }

    async fn track_click(
        &self,
        notification: NotificationUuid,
    ) -> Result<RestockNotificationRecord, NotificationsServiceError> {
        self.track(notification, Engagement::Clicked).await
    }

    async fn track_purchase(
        &self,
        notification: NotificationUuid,
    ) -> Result<RestockNotificationRecord, NotificationsServiceError> {
        self.track(notification, Engagement::Purchased).await
    }

    async fn analytics(&self) -> Result<FunnelRates, NotificationsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let counts = self.repository.funnel_counts(&mut tx).await?;

        tx.commit().await?;

        Ok(counts.rates())
    }
}

#[automock]
#[async_trait]
pub trait NotificationsService: Send + Sync {
    /// Tells an active subscriber their item is back, with a reservation link.
    ///
    /// The notification is recorded only once the message has been handed to the transport.
    async fn send_restock(
        &self,
        subscription: SubscriptionUuid,
    ) -> Result<RestockNotificationRecord, NotificationsServiceError>;

    /// Sends one message covering every listed key the recipient is actively waiting on.
    ///
    /// No keys is a no-op; a single key is sent as a plain restock notice.
    async fn send_consolidated(
        &self,
        email: EmailAddress,
        keys: Vec<StockKey>,
    ) -> Result<Vec<RestockNotificationRecord>, NotificationsServiceError>;

    /// Tells a backorder's owner that its expected date slipped, with a cancellation link.
    async fn send_delay(
        &self,
        order: BackorderRecord,
        expected: Option<Timestamp>,
    ) -> Result<(), NotificationsServiceError>;

    /// Tells a backorder's owner that the order is being fulfilled.
    async fn send_fulfillment(&self, order: BackorderRecord) -> Result<(), NotificationsServiceError>;

    async fn track_open(
        &self,
        notification: NotificationUuid,
    ) -> Result<RestockNotificationRecord, NotificationsServiceError>;

    async fn track_click(
        &self,
        notification: NotificationUuid,
    ) -> Result<RestockNotificationRecord, NotificationsServiceError>;

    async fn track_purchase(
        &self,
        notification: NotificationUuid,
    ) -> Result<RestockNotificationRecord, NotificationsServiceError>;

    /// Open, click and conversion rates over every notification sent.
    async fn analytics(&self) -> Result<FunnelRates, NotificationsServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use restock::{keys::StockKey, status::BackorderStatus};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        domain::{
            backorders::{
                BackordersService,
                data::{NewBackorder, NewBackorderLine},
            },
            waitlist::{WaitlistService, data::NewSubscription, records::Subscribed},
        },
        test::{RecordingTransport, TestContext},
        uuids::UserUuid,
    };

    use super::*;

    async fn subscribe(ctx: &TestContext, email: &str, key: StockKey) -> TestResult<SubscriptionRecord> {
        let subscribed: Subscribed = ctx
            .waitlist
            .subscribe(NewSubscription {
                email: email.to_string(),
                key,
                user: None,
            })
            .await?;

        Ok(subscribed.into_record())
    }

    #[tokio::test]
    async fn send_restock_delivers_and_records_notification() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product("Trail Boot").await?;
        let key = StockKey::product(product);
        let subscription = subscribe(&ctx, "ada@example.com", key).await?;

        let record = ctx.notifications.send_restock(subscription.uuid).await?;

        assert_eq!(record.subscription, subscription.uuid);
        assert!(!record.email_opened);
        assert_eq!(record.reservation_token.len(), 43);

        let window = record.reservation_expires_at.duration_since(record.sent_at);
        assert!(window.as_secs() >= 29 * 60 && window.as_secs() <= 31 * 60);

        let sent = ctx.mail.sent();

        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient.as_str(), "ada@example.com");
        assert_eq!(sent[0].subject, "Trail Boot is back in stock");
        assert!(sent[0].text.contains(&format!("reservation={}", record.reservation_token)));
        assert!(sent[0].text.contains(&format!("/products/{product}")));

        Ok(())
    }

    #[tokio::test]
    async fn send_restock_to_inactive_subscription_sends_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let key = StockKey::product(ctx.create_product("Trail Boot").await?);
        let subscription = subscribe(&ctx, "ada@example.com", key).await?;

        ctx.waitlist.unsubscribe("ada@example.com", key).await?;

        let result = ctx.notifications.send_restock(subscription.uuid).await;

        assert!(
            matches!(result, Err(NotificationsServiceError::InactiveSubscription)),
            "expected InactiveSubscription, got {result:?}"
        );
        assert!(ctx.mail.sent().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn send_restock_to_unknown_subscription_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.notifications.send_restock(SubscriptionUuid::new()).await;

        assert!(
            matches!(result, Err(NotificationsServiceError::SubscriptionNotFound)),
            "expected SubscriptionNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn failed_delivery_is_not_recorded() -> TestResult {
        let ctx = TestContext::new().await;
        let key = StockKey::product(ctx.create_product("Trail Boot").await?);
        let subscription = subscribe(&ctx, "ada@example.com", key).await?;
        let failing = ctx.notifications_with(Arc::new(RecordingTransport::failing()));

        let result = failing.send_restock(subscription.uuid).await;

        assert!(
            matches!(result, Err(NotificationsServiceError::Delivery(_))),
            "expected Delivery, got {result:?}"
        );
        assert_eq!(ctx.notifications.analytics().await?.total_sent, 0);

        Ok(())
    }

    #[tokio::test]
    async fn delivered_notice_that_cannot_be_recorded_is_reported_as_unrecorded() -> TestResult {
        let ctx = TestContext::new().await;
        let key = StockKey::product(ctx.create_product("Trail Boot").await?);
        let subscription = subscribe(&ctx, "ada@example.com", key).await?;

        // A hold this long cannot be represented as an expiry timestamp.
        let unrecordable = PgNotificationsService::new(
            Db::new(ctx.db.pool().clone()),
            ctx.mail.clone(),
            NotificationSettings::new("https://shop.example.com", u32::MAX),
        );

        let result = unrecordable.send_restock(subscription.uuid).await;

        assert!(
            matches!(
                &result,
                Err(NotificationsServiceError::Unrecorded { subscriptions, .. })
                    if subscriptions == &vec![subscription.uuid]
            ),
            "expected Unrecorded, got {result:?}"
        );
        assert_eq!(ctx.mail.sent().len(), 1, "the message still went out");
        assert_eq!(ctx.notifications.analytics().await?.total_sent, 0);

        Ok(())
    }

    #[tokio::test]
    async fn send_consolidated_without_items_is_a_no_op() -> TestResult {
        let ctx = TestContext::new().await;

        let records = ctx
            .notifications
            .send_consolidated(EmailAddress::parse("ada@example.com")?, Vec::new())
            .await?;

        assert!(records.is_empty());
        assert!(ctx.mail.sent().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn send_consolidated_with_one_item_sends_plain_notice() -> TestResult {
        let ctx = TestContext::new().await;
        let key = StockKey::product(ctx.create_product("Trail Boot").await?);
        subscribe(&ctx, "ada@example.com", key).await?;

        let records = ctx
            .notifications
            .send_consolidated(EmailAddress::parse("ada@example.com")?, vec![key])
            .await?;

        assert_eq!(records.len(), 1);
        assert_eq!(ctx.mail.sent()[0].subject, "Trail Boot is back in stock");

        Ok(())
    }

    #[tokio::test]
    async fn send_consolidated_sends_one_message_and_records_each_item() -> TestResult {
        let ctx = TestContext::new().await;
        let boots = StockKey::product(ctx.create_product("Trail Boot").await?);
        let scarf = StockKey::product(ctx.create_product("Wool Scarf").await?);
        let hat = StockKey::product(ctx.create_product("Sun Hat").await?);

        subscribe(&ctx, "ada@example.com", boots).await?;
        subscribe(&ctx, "ada@example.com", scarf).await?;
        subscribe(&ctx, "ada@example.com", hat).await?;
        ctx.waitlist.unsubscribe("ada@example.com", hat).await?;

        let records = ctx
            .notifications
            .send_consolidated(
                EmailAddress::parse("ada@example.com")?,
                vec![boots, scarf, hat],
            )
            .await?;

        assert_eq!(records.len(), 2);

        let sent = ctx.mail.sent();

        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "2 items on your waitlist are back in stock");
        assert!(sent[0].text.contains("Trail Boot"));
        assert!(sent[0].text.contains("Wool Scarf"));
        assert!(!sent[0].text.contains("Sun Hat"));

        Ok(())
    }

    #[tokio::test]
    async fn tracking_is_monotonic_and_idempotent() -> TestResult {
        let ctx = TestContext::new().await;
        let key = StockKey::product(ctx.create_product("Trail Boot").await?);
        let subscription = subscribe(&ctx, "ada@example.com", key).await?;
        let record = ctx.notifications.send_restock(subscription.uuid).await?;

        let clicked = ctx.notifications.track_click(record.uuid).await?;

        assert!(clicked.email_opened);
        assert!(clicked.link_clicked);
        assert!(!clicked.purchase_completed);

        let opened = ctx.notifications.track_open(record.uuid).await?;

        assert!(opened.link_clicked);

        ctx.notifications.track_purchase(record.uuid).await?;
        let purchased = ctx.notifications.track_purchase(record.uuid).await?;

        assert!(purchased.email_opened && purchased.link_clicked && purchased.purchase_completed);

        Ok(())
    }

    #[tokio::test]
    async fn tracking_unknown_notification_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.notifications.track_open(NotificationUuid::new()).await;

        assert!(
            matches!(result, Err(NotificationsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn analytics_reports_funnel_rates() -> TestResult {
        let ctx = TestContext::new().await;

        assert_eq!(ctx.notifications.analytics().await?, FunnelRates::default());

        let mut notifications = Vec::new();

        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            let key = StockKey::product(ctx.create_product("Trail Boot").await?);
            let subscription = subscribe(&ctx, email, key).await?;

            notifications.push(ctx.notifications.send_restock(subscription.uuid).await?.uuid);
        }

        ctx.notifications.track_open(notifications[0]).await?;
        ctx.notifications.track_purchase(notifications[1]).await?;

        let rates = ctx.notifications.analytics().await?;

        assert_eq!(rates.total_sent, 3);
        assert_eq!(rates.open_rate, Decimal::new(6667, 2));
        assert_eq!(rates.click_rate, Decimal::new(3333, 2));
        assert_eq!(rates.conversion_rate, Decimal::new(3333, 2));

        Ok(())
    }

    #[tokio::test]
    async fn delay_and_fulfillment_notices_go_to_order_contact() -> TestResult {
        let ctx = TestContext::new().await;
        let key = StockKey::product(ctx.create_product("Trail Boot").await?);

        let order = ctx
            .backorders
            .create(NewBackorder {
                uuid: BackorderUuid::new(),
                user: UserUuid::new(),
                email: "ada@example.com".to_string(),
                currency: "GBP".to_string(),
                items: vec![NewBackorderLine {
                    key,
                    quantity: 1,
                    price: 1000,
                    size: None,
                    color: None,
                }],
            })
            .await?;

        assert_eq!(order.status, BackorderStatus::Pending);

        ctx.notifications.send_delay(order.clone(), None).await?;
        ctx.notifications.send_fulfillment(order.clone()).await?;

        let sent = ctx.mail.sent();

        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|email| email.recipient.as_str() == "ada@example.com"));
        assert!(sent[0].text.contains(&format!("/backorders/{}/cancel", order.uuid)));
        assert_eq!(sent[1].subject, "Your backorder is on its way");

        Ok(())
    }
}
