//! Backorder Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use restock::{
    allocation::Claim,
    keys::{StockKey, VariantUuid},
    status::BackorderStatus,
};
use rustc_hash::FxHashMap;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
};
use uuid::Uuid;

use crate::{
    domain::{
        backorders::{
            data::NewBackorderLine,
            records::{BackorderLineItemRecord, BackorderRecord, BackorderUuid, LineItemUuid},
        },
        stock::repository::{to_amount, try_get_amount},
        waitlist::repository::try_get_email,
    },
    uuids::UserUuid,
};

const NEXT_PRIORITY_SQL: &str = include_str!("sql/next_priority.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_LINE_ITEM_SQL: &str = include_str!("sql/create_line_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_LINE_ITEMS_SQL: &str = include_str!("sql/get_line_items.sql");
const LIST_PENDING_SQL: &str = include_str!("sql/list_pending.sql");
const LIST_PENDING_FOR_KEY_SQL: &str = include_str!("sql/list_pending_for_key.sql");
const LIST_CUSTOMER_ORDERS_SQL: &str = include_str!("sql/list_customer_orders.sql");
const CANCEL_ORDER_SQL: &str = include_str!("sql/cancel_order.sql");
const COMPLETE_ORDER_SQL: &str = include_str!("sql/complete_order.sql");
const MARK_PROCESSING_SQL: &str = include_str!("sql/mark_processing.sql");
const LINE_KEYS_SQL: &str = include_str!("sql/line_keys.sql");
const RELEASE_ALLOCATED_SQL: &str = include_str!("sql/release_allocated.sql");
const LOCK_PENDING_FOR_KEY_SQL: &str = include_str!("sql/lock_pending_for_key.sql");
const ALLOCATION_CLAIMS_SQL: &str = include_str!("sql/allocation_claims.sql");
const ALLOCATE_LINES_SQL: &str = include_str!("sql/allocate_lines.sql");

/// Order columns needed to insert a backorder header.
#[derive(Debug, Clone)]
pub(crate) struct OrderHeader<'a> {
    pub(crate) uuid: BackorderUuid,
    pub(crate) user: UserUuid,
    pub(crate) email: &'a str,
    pub(crate) total_amount: i64,
    pub(crate) currency: &'a str,
    pub(crate) priority: i64,
    pub(crate) expected_fulfillment_date: Option<Timestamp>,
}

/// An allocated line given back by a cancelled order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReleasedLine {
    pub(crate) key: StockKey,
    pub(crate) quantity: u64,

    /// The units were taken off `quantity_available` when the line was allocated.
    pub(crate) was_deducted: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBackordersRepository;

impl PgBackordersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Take the next priority from the counter row, holding its lock until commit.
    pub(crate) async fn next_priority(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<i64, sqlx::Error> {
        query_scalar(NEXT_PRIORITY_SQL).fetch_one(&mut **tx).await
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        header: &OrderHeader<'_>,
    ) -> Result<BackorderRecord, sqlx::Error> {
        query_as::<Postgres, BackorderRecord>(CREATE_ORDER_SQL)
            .bind(header.uuid.into_uuid())
            .bind(header.user.into_uuid())
            .bind(header.email)
            .bind(header.total_amount)
            .bind(header.currency)
            .bind(header.priority)
            .bind(header.expected_fulfillment_date.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_line_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: BackorderUuid,
        position: i32,
        line: &NewBackorderLine,
    ) -> Result<BackorderLineItemRecord, sqlx::Error> {
        query_as::<Postgres, BackorderLineItemRecord>(CREATE_LINE_ITEM_SQL)
            .bind(LineItemUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(position)
            .bind(line.key.product_uuid().into_uuid())
            .bind(line.key.variant_uuid().map(VariantUuid::into_uuid))
            .bind(to_amount(line.quantity, "quantity")?)
            .bind(line.size.as_deref())
            .bind(line.color.as_deref())
            .bind(to_amount(line.price, "price")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: BackorderUuid,
    ) -> Result<Option<BackorderRecord>, sqlx::Error> {
        let order = query_as::<Postgres, BackorderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        Ok(self.with_items(tx, vec![order]).await?.pop())
    }

    /// Pending orders by ascending priority, optionally only those still waiting on `key`.
    pub(crate) async fn list_pending(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: Option<StockKey>,
    ) -> Result<Vec<BackorderRecord>, sqlx::Error> {
        let orders = match key {
            Some(key) => {
                query_as::<Postgres, BackorderRecord>(LIST_PENDING_FOR_KEY_SQL)
                    .bind(key.product_uuid().into_uuid())
                    .bind(key.variant_key())
                    .fetch_all(&mut **tx)
                    .await?
            }
            None => {
                query_as::<Postgres, BackorderRecord>(LIST_PENDING_SQL)
                    .fetch_all(&mut **tx)
                    .await?
            }
        };

        self.with_items(tx, orders).await
    }

    pub(crate) async fn list_for_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<BackorderRecord>, sqlx::Error> {
        let orders = query_as::<Postgres, BackorderRecord>(LIST_CUSTOMER_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        self.with_items(tx, orders).await
    }

    /// Cancel a pending order; `None` when it is missing or no longer pending.
    pub(crate) async fn cancel(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: BackorderUuid,
    ) -> Result<Option<BackorderRecord>, sqlx::Error> {
        query_as::<Postgres, BackorderRecord>(CANCEL_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Mark a processing order fulfilled; `None` when it is missing or not processing.
    pub(crate) async fn complete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: BackorderUuid,
    ) -> Result<Option<BackorderRecord>, sqlx::Error> {
        query_as::<Postgres, BackorderRecord>(COMPLETE_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn mark_processing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: BackorderUuid,
    ) -> Result<(), sqlx::Error> {
        query(MARK_PROCESSING_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Distinct keys of an order's lines, in storage order.
    pub(crate) async fn line_keys(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: BackorderUuid,
    ) -> Result<Vec<StockKey>, sqlx::Error> {
        let rows = query(LINE_KEYS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(StockKey::from_storage(
                    row.try_get("product_uuid")?,
                    row.try_get("variant_uuid")?,
                ))
            })
            .collect()
    }

    /// Every allocated line of an order, clearing its deducted flag.
    pub(crate) async fn release_allocated(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: BackorderUuid,
    ) -> Result<Vec<ReleasedLine>, sqlx::Error> {
        let rows = query(RELEASE_ALLOCATED_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(ReleasedLine {
                    key: StockKey::from_storage(row.try_get("product_uuid")?, row.try_get("variant_uuid")?),
                    quantity: try_get_amount(row, "quantity")?,
                    was_deducted: row.try_get("was_deducted")?,
                })
            })
            .collect()
    }

    /// Lock every pending order still waiting on `key`, in priority order.
    pub(crate) async fn lock_pending_for_key(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        query_scalar(LOCK_PENDING_FOR_KEY_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .fetch_all(&mut **tx)
            .await
    }

    /// Per-order demand for `key` among the locked `orders`, in priority order.
    pub(crate) async fn allocation_claims(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
        orders: &[Uuid],
    ) -> Result<Vec<Claim<BackorderUuid>>, sqlx::Error> {
        let rows = query(ALLOCATION_CLAIMS_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .bind(orders)
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(Claim {
                    order: BackorderUuid::from_uuid(row.try_get("uuid")?),
                    priority: row.try_get("backorder_priority")?,
                    quantity: try_get_amount(row, "requested")?,
                    completes_order: row.try_get::<i64, _>("other_open_lines")? == 0,
                })
            })
            .collect()
    }

    /// Allocate an order's open lines for `key`.
    pub(crate) async fn allocate_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: BackorderUuid,
        key: StockKey,
        stock_deducted: bool,
    ) -> Result<(), sqlx::Error> {
        query(ALLOCATE_LINES_SQL)
            .bind(order.into_uuid())
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_key())
            .bind(stock_deducted)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn with_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut orders: Vec<BackorderRecord>,
    ) -> Result<Vec<BackorderRecord>, sqlx::Error> {
        if orders.is_empty() {
            return Ok(orders);
        }

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let items = query_as::<Postgres, BackorderLineItemRecord>(GET_LINE_ITEMS_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut by_order: FxHashMap<BackorderUuid, Vec<BackorderLineItemRecord>> =
            FxHashMap::default();

        for item in items {
            by_order.entry(item.order).or_default().push(item);
        }

        for order in &mut orders {
            order.items = by_order.remove(&order.uuid).unwrap_or_default();
        }

        Ok(orders)
    }
}

impl<'r> FromRow<'r, PgRow> for BackorderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: BackorderUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            email: try_get_email(row, "email")?,
            status: status
                .parse::<BackorderStatus>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "status".to_string(),
                    source: Box::new(e),
                })?,
            total_amount: try_get_amount(row, "total_amount")?,
            currency: row.try_get("currency")?,
            priority: row.try_get("backorder_priority")?,
            expected_fulfillment_date: row
                .try_get::<Option<SqlxTimestamp>, _>("expected_fulfillment_date")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            items: Vec::new(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for BackorderLineItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let position: i32 = row.try_get("position")?;

        Ok(Self {
            uuid: LineItemUuid::from_uuid(row.try_get("uuid")?),
            order: BackorderUuid::from_uuid(row.try_get("order_uuid")?),
            position: u32::try_from(position).map_err(|e| sqlx::Error::ColumnDecode {
                index: "position".to_string(),
                source: Box::new(e),
            })?,
            key: StockKey::from_storage(row.try_get("product_uuid")?, row.try_get("variant_uuid")?),
            quantity: try_get_amount(row, "quantity")?,
            size: row.try_get("size")?,
            color: row.try_get("color")?,
            price: try_get_amount(row, "price")?,
            allocated_at: row
                .try_get::<Option<SqlxTimestamp>, _>("allocated_at")?
                .map(SqlxTimestamp::to_jiff),
            stock_deducted: row.try_get("stock_deducted")?,
        })
    }
}
