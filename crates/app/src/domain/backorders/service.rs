//! Backorder service.

use async_trait::async_trait;
use mockall::automock;
use restock::{
    allocation::{AllocationPolicy, allocate_fifo},
    email::EmailAddress,
    keys::{StockKey, merge_quantities},
    pricing::{find_currency, order_total},
    schedule::latest_expected,
};
use rustc_hash::FxHashMap;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        backorders::{
            data::NewBackorder,
            errors::BackordersServiceError,
            records::{AllocationOutcome, BackorderRecord, BackorderUuid, CancelledBackorder},
            repository::{OrderHeader, PgBackordersRepository},
        },
        catalog::repository::PgCatalogRepository,
        schedules::repository::PgSchedulesRepository,
        stock::{records::StockChange, repository::PgStockRepository},
    },
    uuids::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgBackordersService {
    db: Db,
    repository: PgBackordersRepository,
    catalog: PgCatalogRepository,
    schedules: PgSchedulesRepository,
    stock: PgStockRepository,
}

impl PgBackordersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgBackordersRepository::new(),
            catalog: PgCatalogRepository::new(),
            schedules: PgSchedulesRepository::new(),
            stock: PgStockRepository::new(),
        }
    }
}

#[async_trait]
impl BackordersService for PgBackordersService {
    #[tracing::instrument(
        name = "backorders.service.create",
        skip(self, backorder),
        fields(backorder_uuid = %backorder.uuid, item_count = backorder.items.len()),
        err
    )]
    async fn create(&self, backorder: NewBackorder) -> Result<BackorderRecord, BackordersServiceError> {
        let email = EmailAddress::parse(&backorder.email)?;
        let currency = find_currency(&backorder.currency)?;
        let requested = merge_quantities(backorder.items.iter().map(|line| (line.key, line.quantity)))?;

        let total = order_total(
            backorder.items.iter().map(|line| (line.price, line.quantity)),
            currency,
        )?;

        let mut tx = self.db.begin_transaction().await?;
        let mut expected_dates = Vec::with_capacity(requested.len());

        for &(key, quantity) in &requested {
            if !self.catalog.exists(&mut tx, key).await? {
                return Err(BackordersServiceError::UnknownItem(key));
            }

            let current_stock = self
                .stock
                .get_stock(&mut tx, key)
                .await?
                .filter(|record| record.active)
                .map_or(0, |record| record.quantity_available);

            if current_stock >= quantity {
                return Err(BackordersServiceError::StockAvailable {
                    key,
                    requested: quantity,
                    current_stock,
                });
            }

            let schedule = self.schedules.get(&mut tx, key).await?;

            expected_dates.push(schedule.and_then(|schedule| schedule.expected_date));
        }

        let priority = self.repository.next_priority(&mut tx).await?;

        let mut order = self
            .repository
            .create_order(
                &mut tx,
                &OrderHeader {
                    uuid: backorder.uuid,
                    user: backorder.user,
                    email: email.as_str(),
                    total_amount: total.to_minor_units(),
                    currency: currency.iso_alpha_code,
                    priority,
                    expected_fulfillment_date: latest_expected(expected_dates),
                },
            )
            .await?;

        for (position, line) in backorder.items.iter().enumerate() {
            let position = i32::try_from(position)?;
            let item = self
                .repository
                .create_line_item(&mut tx, order.uuid, position, line)
                .await?;

            order.items.push(item);
        }

        tx.commit().await?;

        info!(backorder_uuid = %order.uuid, priority, "created backorder");

        Ok(order)
    }

    #[tracing::instrument(
        name = "backorders.service.cancel",
        skip(self, order),
        fields(backorder_uuid = %order),
        err
    )]
    async fn cancel(&self, order: BackorderUuid) -> Result<CancelledBackorder, BackordersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        // Stock rows before the order row, matching allocation's lock order.
        for key in self.repository.line_keys(&mut tx, order).await? {
            self.stock.lock_stock(&mut tx, key).await?;
        }

        if self.repository.cancel(&mut tx, order).await?.is_none() {
            let existing = self
                .repository
                .get(&mut tx, order)
                .await?
                .ok_or(BackordersServiceError::NotFound)?;

            return Err(BackordersServiceError::InvalidStatus {
                status: existing.status,
            });
        }

        let lines = self.repository.release_allocated(&mut tx, order).await?;
        let mut released = Vec::new();

        if !lines.is_empty() {
            let mut deducted: FxHashMap<StockKey, u64> = FxHashMap::default();

            for line in lines.iter().filter(|line| line.was_deducted) {
                let units = deducted.entry(line.key).or_insert(0);

                *units = units.saturating_add(line.quantity);
            }

            let totals = merge_quantities(lines.iter().map(|line| (line.key, line.quantity)))?;

            for (key, quantity) in totals {
                let current = match deducted.get(&key) {
                    Some(&units) => self.stock.increment(&mut tx, key, units).await?,
                    None => self
                        .stock
                        .get_stock(&mut tx, key)
                        .await?
                        .map_or(0, |record| record.quantity_available),
                };

                // Ledger-only units never left the stock count, so only the release is reported.
                released.push(StockChange {
                    key,
                    previous: current.saturating_sub(quantity),
                    current,
                });
            }
        }

        let cancelled = self
            .repository
            .get(&mut tx, order)
            .await?
            .ok_or(BackordersServiceError::NotFound)?;

        tx.commit().await?;

        info!(released_keys = released.len(), "cancelled backorder");

        Ok(CancelledBackorder {
            order: cancelled,
            released,
        })
    }

    async fn list_pending(
        &self,
        key: Option<StockKey>,
    ) -> Result<Vec<BackorderRecord>, BackordersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let orders = self.repository.list_pending(&mut tx, key).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn get_status(
        &self,
        order: BackorderUuid,
    ) -> Result<Option<BackorderRecord>, BackordersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let order = self.repository.get(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_for_customer(
        &self,
        user: UserUuid,
    ) -> Result<Vec<BackorderRecord>, BackordersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let orders = self.repository.list_for_customer(&mut tx, user).await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "backorders.service.complete",
        skip(self, order),
        fields(backorder_uuid = %order),
        err
    )]
    async fn complete(&self, order: BackorderUuid) -> Result<BackorderRecord, BackordersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        if self.repository.complete(&mut tx, order).await?.is_none() {
            let existing = self
                .repository
                .get(&mut tx, order)
                .await?
                .ok_or(BackordersServiceError::NotFound)?;

            return Err(BackordersServiceError::InvalidStatus {
                status: existing.status,
            });
        }

        let completed = self
            .repository
            .get(&mut tx, order)
            .await?
            .ok_or(BackordersServiceError::NotFound)?;

        tx.commit().await?;

        info!("completed backorder");

        Ok(completed)
    }

    #[tracing::instrument(
        name = "backorders.service.allocate",
        skip(self, key),
        fields(key = %key),
        err
    )]
    async fn allocate(
        &self,
        key: StockKey,
        quantity: u64,
        policy: AllocationPolicy,
    ) -> Result<AllocationOutcome, BackordersServiceError> {
        if quantity == 0 {
            return Ok(AllocationOutcome::unallocated(key, 0));
        }

        let mut tx = self.db.begin_transaction().await?;

        let available = if policy.deducts_stock() {
            let on_hand = self
                .stock
                .lock_stock(&mut tx, key)
                .await?
                .map_or(0, |record| record.quantity_available);

            policy.allocatable(quantity, on_hand)
        } else {
            quantity
        };

        let locked = self.repository.lock_pending_for_key(&mut tx, key).await?;

        if locked.is_empty() || available == 0 {
            tx.commit().await?;

            return Ok(AllocationOutcome::unallocated(key, available));
        }

        let claims = self
            .repository
            .allocation_claims(&mut tx, key, &locked)
            .await?;

        let allocation = allocate_fifo(&claims, available)?;

        for grant in &allocation.granted {
            self.repository
                .allocate_lines(&mut tx, grant.order, key, policy.deducts_stock())
                .await?;

            if grant.completes_order {
                self.repository.mark_processing(&mut tx, grant.order).await?;
            }
        }

        let allocated = allocation.total_granted();

        if policy.deducts_stock() && allocated > 0 {
            self.stock
                .decrement(&mut tx, key, allocated)
                .await?
                .ok_or(BackordersServiceError::StockExhausted(key))?;
        }

        tx.commit().await?;

        let fulfilled_orders: Vec<BackorderUuid> = allocation.completed_orders().collect();

        info!(
            allocated,
            remaining = allocation.remaining,
            fulfilled = fulfilled_orders.len(),
            %policy,
            "allocated restocked units to backorders"
        );

        Ok(AllocationOutcome {
            key,
            allocated,
            remaining: allocation.remaining,
            fulfilled_orders,
            blocked_by: allocation.blocked_by,
        })
    }
}

#[automock]
#[async_trait]
pub trait BackordersService: Send + Sync {
    /// Accepts an order for items that are not currently in stock.
    ///
    /// The order receives the next fulfilment priority. Rejected when any item already has
    /// enough stock to be bought outright.
    async fn create(&self, backorder: NewBackorder)
    -> Result<BackorderRecord, BackordersServiceError>;

    /// Cancels a pending order, handing back any stock already deducted for it.
    async fn cancel(&self, order: BackorderUuid) -> Result<CancelledBackorder, BackordersServiceError>;

    /// Pending orders in priority order, optionally only those still waiting on a key.
    async fn list_pending(
        &self,
        key: Option<StockKey>,
    ) -> Result<Vec<BackorderRecord>, BackordersServiceError>;

    /// An order with its lines, if it exists.
    async fn get_status(
        &self,
        order: BackorderUuid,
    ) -> Result<Option<BackorderRecord>, BackordersServiceError>;

    /// A customer's orders, newest first.
    async fn list_for_customer(
        &self,
        user: UserUuid,
    ) -> Result<Vec<BackorderRecord>, BackordersServiceError>;

    /// Marks a processing order as shipped.
    async fn complete(&self, order: BackorderUuid) -> Result<BackorderRecord, BackordersServiceError>;

    /// Hands `quantity` newly available units of a key to pending orders in priority order.
    ///
    /// An order is served only when its whole demand for the key fits; the first order that
    /// does not fit stops the walk.
    async fn allocate(
        &self,
        key: StockKey,
        quantity: u64,
        policy: AllocationPolicy,
    ) -> Result<AllocationOutcome, BackordersServiceError>;
}
