//! Inventory reconciliation coordinator.
//!
//! Reacts to stock increases: clears the restock schedule, allocates the new units to pending
//! backorders in priority order, tells fulfilled orders' owners, then notifies the waitlist
//! about whatever is left. Every step after the triggering write is best effort.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use restock::{
    allocation::AllocationPolicy,
    consolidation::{Dispatch, plan_dispatches},
    email::EmailAddress,
    keys::StockKey,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{info, warn};

use crate::domain::{
    backorders::{BackordersService, records::{AllocationOutcome, BackorderUuid}},
    notifications::{NotificationsService, NotificationsServiceError},
    reconciliation::{
        errors::ReconciliationError,
        records::{
            BatchSummary, CancellationSummary, ExpirySummary, ReconciliationSummary,
            RestockSummary, StockUpdate,
        },
    },
    schedules::SchedulesService,
    stock::{StockService, data::StockRequest, records::StockChange},
    waitlist::{WaitlistService, records::SubscriptionUuid},
};

#[derive(Clone)]
pub struct InventoryCoordinator {
    stock: Arc<dyn StockService>,
    waitlist: Arc<dyn WaitlistService>,
    backorders: Arc<dyn BackordersService>,
    schedules: Arc<dyn SchedulesService>,
    notifications: Arc<dyn NotificationsService>,
    policy: AllocationPolicy,
}

impl InventoryCoordinator {
    #[must_use]
    pub fn new(
        stock: Arc<dyn StockService>,
        waitlist: Arc<dyn WaitlistService>,
        backorders: Arc<dyn BackordersService>,
        schedules: Arc<dyn SchedulesService>,
        notifications: Arc<dyn NotificationsService>,
        policy: AllocationPolicy,
    ) -> Self {
        Self {
            stock,
            waitlist,
            backorders,
            schedules,
            notifications,
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Clear the schedule, allocate to backorders and notify fulfilled orders.
    async fn allocate(&self, key: StockKey, delta: u64) -> ReconciliationSummary {
        if let Err(error) = self.schedules.clear(key).await {
            warn!(%key, %error, "failed to clear restock schedule");
        }

        let outcome = match self.backorders.allocate(key, delta, self.policy).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(%key, %error, "backorder allocation failed");

                AllocationOutcome::unallocated(key, delta)
            }
        };

        for order in &outcome.fulfilled_orders {
            self.notify_fulfilled(*order).await;
        }

        ReconciliationSummary {
            key,
            backorders_fulfilled: outcome.fulfilled_orders.len(),
            notifications_sent: 0,
            remaining_quantity: outcome.remaining,
            fulfilled_order_ids: outcome.fulfilled_orders,
        }
    }

    async fn notify_fulfilled(&self, order: BackorderUuid) {
        let record = match self.backorders.get_status(order).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!(backorder_uuid = %order, "fulfilled backorder disappeared");
                return;
            }
            Err(error) => {
                warn!(backorder_uuid = %order, %error, "failed to load fulfilled backorder");
                return;
            }
        };

        if let Err(error) = self.notifications.send_fulfillment(record).await {
            warn!(backorder_uuid = %order, %error, "failed to send fulfillment notification");
        }
    }

    /// Notify everyone waiting on `keys`, one message per recipient. Returns notices delivered
    /// per key.
    async fn notify_waitlist(&self, keys: &[StockKey]) -> FxHashMap<StockKey, usize> {
        let mut entries: Vec<(EmailAddress, (StockKey, SubscriptionUuid))> = Vec::new();
        let mut keys_by_subscription: FxHashMap<SubscriptionUuid, StockKey> = FxHashMap::default();

        for &key in keys {
            match self.waitlist.list_for_product(key).await {
                Ok(subscribers) => {
                    for subscriber in subscribers {
                        keys_by_subscription.insert(subscriber.uuid, key);
                        entries.push((subscriber.email, (key, subscriber.uuid)));
                    }
                }
                Err(error) => warn!(%key, %error, "failed to list waitlist subscribers"),
            }
        }

        let mut sent: FxHashMap<StockKey, usize> = FxHashMap::default();

        for dispatch in plan_dispatches(entries) {
            match dispatch {
                Dispatch::Single {
                    email,
                    item: (key, subscription),
                } => match self.notifications.send_restock(subscription).await {
                    Ok(_) => *sent.entry(key).or_default() += 1,
                    Err(error @ NotificationsServiceError::Unrecorded { .. }) => {
                        warn!(
                            recipient = %email,
                            %key,
                            %error,
                            "restock notification sent without a record"
                        );

                        *sent.entry(key).or_default() += 1;
                    }
                    Err(error) => {
                        warn!(recipient = %email, %key, %error, "failed to send restock notification");
                    }
                },
                Dispatch::Consolidated { email, items } => {
                    let keys: Vec<StockKey> = items.iter().map(|(key, _)| *key).collect();

                    match self
                        .notifications
                        .send_consolidated(email.clone(), keys)
                        .await
                    {
                        Ok(records) => {
                            for record in records {
                                if let Some(key) = keys_by_subscription.get(&record.subscription) {
                                    *sent.entry(*key).or_default() += 1;
                                }
                            }
                        }
                        Err(NotificationsServiceError::Unrecorded { subscriptions, source }) => {
                            warn!(
                                recipient = %email,
                                error = %source,
                                "consolidated restock notification sent without records"
                            );

                            for subscription in subscriptions {
                                if let Some(key) = keys_by_subscription.get(&subscription) {
                                    *sent.entry(*key).or_default() += 1;
                                }
                            }
                        }
                        Err(error) => {
                            warn!(recipient = %email, %error, "failed to send consolidated restock notification");
                        }
                    }
                }
            }
        }

        sent
    }

    async fn reconcile(&self, changes: &[StockChange]) -> BatchSummary {
        let mut summaries = Vec::with_capacity(changes.len());

        for change in changes {
            if change.is_increase() {
                let delta = change.current - change.previous;

                summaries.push(self.allocate(change.key, delta).await);
            } else {
                summaries.push(ReconciliationSummary::unchanged(change.key));
            }
        }

        let mut seen = FxHashSet::default();
        let waiting: Vec<StockKey> = summaries
            .iter()
            .filter(|summary| summary.remaining_quantity > 0)
            .map(|summary| summary.key)
            .filter(|key| seen.insert(*key))
            .collect();

        if !waiting.is_empty() {
            let mut sent = self.notify_waitlist(&waiting).await;

            for summary in &mut summaries {
                summary.notifications_sent = sent.remove(&summary.key).unwrap_or_default();
            }
        }

        let batch = BatchSummary { summaries };

        if batch.backorders_fulfilled() > 0 || batch.notifications_sent() > 0 {
            info!(
                backorders_fulfilled = batch.backorders_fulfilled(),
                notifications_sent = batch.notifications_sent(),
                "reconciled inventory increase"
            );
        }

        batch
    }
}

#[async_trait]
impl ReconciliationService for InventoryCoordinator {
    #[tracing::instrument(
        name = "reconciliation.service.on_inventory_increase",
        skip(self, change),
        fields(key = %change.key, previous = change.previous, current = change.current)
    )]
    async fn on_inventory_increase(&self, change: StockChange) -> ReconciliationSummary {
        self.reconcile(&[change])
            .await
            .summaries
            .pop()
            .unwrap_or_else(|| ReconciliationSummary::unchanged(change.key))
    }

    #[tracing::instrument(
        name = "reconciliation.service.on_inventory_increases",
        skip(self, changes),
        fields(change_count = changes.len())
    )]
    async fn on_inventory_increases(&self, changes: Vec<StockChange>) -> BatchSummary {
        self.reconcile(&changes).await
    }

    #[tracing::instrument(
        name = "reconciliation.service.set_stock",
        skip(self, key),
        fields(key = %key),
        err
    )]
    async fn set_stock(&self, key: StockKey, quantity: u64) -> Result<StockUpdate, ReconciliationError> {
        let change = self.stock.set_stock(key, quantity).await?;
        let reconciliation = self.on_inventory_increase(change).await;

        Ok(StockUpdate {
            change,
            reconciliation,
        })
    }

    #[tracing::instrument(
        name = "reconciliation.service.restock",
        skip(self, items),
        fields(item_count = items.len()),
        err
    )]
    async fn restock(&self, items: Vec<StockRequest>) -> Result<RestockSummary, ReconciliationError> {
        let changes = self.stock.restore(items).await?;
        let reconciliation = self.reconcile(&changes).await;

        Ok(RestockSummary {
            changes,
            reconciliation,
        })
    }

    #[tracing::instrument(
        name = "reconciliation.service.cancel_backorder",
        skip(self, order),
        fields(backorder_uuid = %order),
        err
    )]
    async fn cancel_backorder(
        &self,
        order: BackorderUuid,
    ) -> Result<CancellationSummary, ReconciliationError> {
        let cancelled = self.backorders.cancel(order).await?;
        let reconciliation = self.reconcile(&cancelled.released).await;

        Ok(CancellationSummary {
            order: cancelled.order,
            released: cancelled.released,
            reconciliation,
        })
    }

    #[tracing::instrument(name = "reconciliation.service.sweep_expired_schedules", skip(self), err)]
    async fn sweep_expired_schedules(&self) -> Result<ExpirySummary, ReconciliationError> {
        let report = self.schedules.sweep_expired().await?;

        let mut notified = FxHashSet::default();
        let mut delay_notifications_sent = 0;

        for expired in &report.expired {
            let orders = match self.backorders.list_pending(Some(expired.key)).await {
                Ok(orders) => orders,
                Err(error) => {
                    warn!(key = %expired.key, %error, "failed to list delayed backorders");
                    continue;
                }
            };

            for order in orders {
                if !notified.insert(order.uuid) {
                    continue;
                }

                let uuid = order.uuid;

                match self.notifications.send_delay(order, None).await {
                    Ok(()) => delay_notifications_sent += 1,
                    Err(error) => {
                        warn!(backorder_uuid = %uuid, %error, "failed to send delay notification");
                    }
                }
            }
        }

        info!(
            expired_count = report.expired_count(),
            delay_notifications_sent, "expired restock schedules"
        );

        Ok(ExpirySummary {
            expired: report.expired,
            delay_notifications_sent,
        })
    }
}

#[automock]
#[async_trait]
pub trait ReconciliationService: Send + Sync {
    /// Reacts to a stock level change; anything other than an increase is ignored.
    async fn on_inventory_increase(&self, change: StockChange) -> ReconciliationSummary;

    /// Reacts to several changes at once, sending each waiting recipient a single message.
    async fn on_inventory_increases(&self, changes: Vec<StockChange>) -> BatchSummary;

    /// Overwrites a stock level and reconciles the difference.
    async fn set_stock(&self, key: StockKey, quantity: u64) -> Result<StockUpdate, ReconciliationError>;

    /// Adds restocked quantities and reconciles them.
    async fn restock(&self, items: Vec<StockRequest>) -> Result<RestockSummary, ReconciliationError>;

    /// Cancels a backorder and reconciles any stock it gives back.
    async fn cancel_backorder(
        &self,
        order: BackorderUuid,
    ) -> Result<CancellationSummary, ReconciliationError>;

    /// Expires passed restock dates and tells affected backorder owners.
    async fn sweep_expired_schedules(&self) -> Result<ExpirySummary, ReconciliationError>;
}
