//! Backorder Records

use jiff::Timestamp;
use restock::{email::EmailAddress, keys::StockKey, status::BackorderStatus};

use crate::{
    domain::stock::records::StockChange,
    uuids::{TypedUuid, UserUuid},
};

/// Backorder UUID
pub type BackorderUuid = TypedUuid<BackorderRecord>;

/// Backorder Line Item UUID
pub type LineItemUuid = TypedUuid<BackorderLineItemRecord>;

/// Backorder Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackorderRecord {
    pub uuid: BackorderUuid,
    pub user: UserUuid,
    pub email: EmailAddress,
    pub status: BackorderStatus,

    /// Order total in minor units of `currency`.
    pub total_amount: u64,
    pub currency: String,
    pub priority: i64,
    pub expected_fulfillment_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub items: Vec<BackorderLineItemRecord>,
}

impl BackorderRecord {
    /// Whether every line has been allocated.
    #[must_use]
    pub fn is_fully_allocated(&self) -> bool {
        self.items.iter().all(BackorderLineItemRecord::is_allocated)
    }
}

/// Backorder Line Item Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackorderLineItemRecord {
    pub uuid: LineItemUuid,
    pub order: BackorderUuid,
    pub position: u32,
    pub key: StockKey,
    pub quantity: u64,
    pub size: Option<String>,
    pub color: Option<String>,

    /// Unit price in minor units.
    pub price: u64,
    pub allocated_at: Option<Timestamp>,
    pub stock_deducted: bool,
}

impl BackorderLineItemRecord {
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.allocated_at.is_some()
    }
}

/// A cancelled order and the stock its allocated lines gave back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelledBackorder {
    pub order: BackorderRecord,
    pub released: Vec<StockChange>,
}

/// Result of allocating newly available units of one key to pending orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    pub key: StockKey,

    /// Units handed to orders.
    pub allocated: u64,

    /// Units left over for the waitlist.
    pub remaining: u64,

    /// Orders that became fully allocated, in priority order.
    pub fulfilled_orders: Vec<BackorderUuid>,

    /// The order that stopped the walk, if any.
    pub blocked_by: Option<BackorderUuid>,
}

impl AllocationOutcome {
    #[must_use]
    pub fn unallocated(key: StockKey, quantity: u64) -> Self {
        Self {
            key,
            allocated: 0,
            remaining: quantity,
            fulfilled_orders: Vec::new(),
            blocked_by: None,
        }
    }
}
