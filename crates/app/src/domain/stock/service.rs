//! Stock service.

use async_trait::async_trait;
use mockall::automock;
use restock::keys::{StockKey, merge_quantities};
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        catalog::repository::PgCatalogRepository,
        stock::{
            data::StockRequest,
            errors::StockServiceError,
            records::{Availability, Shortfall, StockChange, StockRecord},
            repository::PgStockRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgStockService {
    db: Db,
    stock: PgStockRepository,
    catalog: PgCatalogRepository,
}

impl PgStockService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            stock: PgStockRepository::new(),
            catalog: PgCatalogRepository::new(),
        }
    }

    async fn ensure_known(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
    ) -> Result<(), StockServiceError> {
        if self.catalog.exists(tx, key).await? {
            Ok(())
        } else {
            Err(StockServiceError::UnknownItem(key))
        }
    }
}

/// Merge per-key quantities and make sure each fits the storage column.
fn validate_items(items: &[StockRequest]) -> Result<Vec<(StockKey, u64)>, StockServiceError> {
    let merged = merge_quantities(items.iter().map(|item| (item.key, item.quantity)))?;

    for (_, quantity) in &merged {
        i64::try_from(*quantity)?;
    }

    Ok(merged)
}

#[async_trait]
impl StockService for PgStockService {
    #[tracing::instrument(
        name = "stock.service.check_availability",
        skip(self, items),
        fields(item_count = items.len()),
        err
    )]
    async fn check_availability(
        &self,
        items: Vec<StockRequest>,
    ) -> Result<Vec<Availability>, StockServiceError> {
        validate_items(&items)?;

        let mut tx = self.db.begin_transaction().await?;
        let mut availability = Vec::with_capacity(items.len());

        for item in items {
            self.ensure_known(&mut tx, item.key).await?;

            let record = self.stock.get_stock(&mut tx, item.key).await?;

            availability.push(Availability {
                key: item.key,
                requested: item.quantity,
                current_stock: record.as_ref().map_or(0, |r| r.quantity_available),
                available: record.is_some_and(|r| r.can_supply(item.quantity)),
            });
        }

        tx.commit().await?;

        Ok(availability)
    }

    #[tracing::instrument(
        name = "stock.service.reserve",
        skip(self, items),
        fields(item_count = items.len()),
        err
    )]
    async fn reserve(&self, items: Vec<StockRequest>) -> Result<(), StockServiceError> {
        let merged = validate_items(&items)?;

        let mut tx = self.db.begin_transaction().await?;
        let mut shortfalls = Vec::new();

        // Rows are locked in storage order so concurrent batches cannot deadlock.
        for &(key, quantity) in &merged {
            self.ensure_known(&mut tx, key).await?;

            let record = self.stock.lock_stock(&mut tx, key).await?;

            match record {
                Some(record) if record.can_supply(quantity) => {}
                Some(record) => shortfalls.push(Shortfall {
                    key,
                    requested: quantity,
                    current_stock: record.quantity_available,
                    active: record.active,
                }),
                None => shortfalls.push(Shortfall {
                    key,
                    requested: quantity,
                    current_stock: 0,
                    active: true,
                }),
            }
        }

        if !shortfalls.is_empty() {
            tx.rollback().await?;

            return Err(StockServiceError::InsufficientStock(shortfalls));
        }

        for &(key, quantity) in &merged {
            if self.stock.decrement(&mut tx, key, quantity).await?.is_none() {
                return Err(StockServiceError::InsufficientStock(vec![Shortfall {
                    key,
                    requested: quantity,
                    current_stock: 0,
                    active: true,
                }]));
            }
        }

        tx.commit().await?;

        info!(keys = merged.len(), "reserved stock");

        Ok(())
    }

    #[tracing::instrument(
        name = "stock.service.restore",
        skip(self, items),
        fields(item_count = items.len()),
        err
    )]
    async fn restore(
        &self,
        items: Vec<StockRequest>,
    ) -> Result<Vec<StockChange>, StockServiceError> {
        let merged = validate_items(&items)?;

        let mut tx = self.db.begin_transaction().await?;
        let mut changes = Vec::with_capacity(merged.len());

        for (key, quantity) in merged {
            self.ensure_known(&mut tx, key).await?;

            let current = self.stock.increment(&mut tx, key, quantity).await?;

            changes.push(StockChange {
                key,
                previous: current.saturating_sub(quantity),
                current,
            });
        }

        tx.commit().await?;

        info!(keys = changes.len(), "restored stock");

        Ok(changes)
    }

    #[tracing::instrument(
        name = "stock.service.set_stock",
        skip(self, key),
        fields(key = %key),
        err
    )]
    async fn set_stock(
        &self,
        key: StockKey,
        quantity: u64,
    ) -> Result<StockChange, StockServiceError> {
        i64::try_from(quantity)?;

        let mut tx = self.db.begin_transaction().await?;

        self.ensure_known(&mut tx, key).await?;

        let previous = self
            .stock
            .lock_stock(&mut tx, key)
            .await?
            .map_or(0, |record| record.quantity_available);

        let record = self.stock.set_stock(&mut tx, key, quantity).await?;

        tx.commit().await?;

        info!(
            key = %key,
            previous,
            current = record.quantity_available,
            "set stock level"
        );

        Ok(StockChange {
            key,
            previous,
            current: record.quantity_available,
        })
    }

    async fn get_stock(&self, key: StockKey) -> Result<StockRecord, StockServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .stock
            .get_stock(&mut tx, key)
            .await?
            .ok_or(StockServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "stock.service.set_active",
        skip(self, key),
        fields(key = %key),
        err
    )]
    async fn set_active(
        &self,
        key: StockKey,
        active: bool,
    ) -> Result<StockRecord, StockServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.stock.set_active(&mut tx, key, active).await?;

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait StockService: Send + Sync {
    /// Reports, per item, whether the requested quantity can be sold right now.
    async fn check_availability(
        &self,
        items: Vec<StockRequest>,
    ) -> Result<Vec<Availability>, StockServiceError>;

    /// Atomically removes every requested quantity, or nothing if any item falls short.
    async fn reserve(&self, items: Vec<StockRequest>) -> Result<(), StockServiceError>;

    /// Atomically adds every quantity back, creating missing records.
    async fn restore(
        &self,
        items: Vec<StockRequest>,
    ) -> Result<Vec<StockChange>, StockServiceError>;

    /// Overwrites the stock level for a key, returning the previous and new level.
    async fn set_stock(
        &self,
        key: StockKey,
        quantity: u64,
    ) -> Result<StockChange, StockServiceError>;

    /// Retrieves the stock record for a key.
    async fn get_stock(&self, key: StockKey) -> Result<StockRecord, StockServiceError>;

    /// Marks a key as sellable or not.
    async fn set_active(
        &self,
        key: StockKey,
        active: bool,
    ) -> Result<StockRecord, StockServiceError>;
}
