//! Reconciliation Records

use restock::keys::StockKey;

use crate::domain::{
    backorders::records::{BackorderRecord, BackorderUuid},
    schedules::records::ExpiredSchedule,
    stock::records::StockChange,
};

/// What one stock increase led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationSummary {
    pub key: StockKey,
    pub backorders_fulfilled: usize,

    /// Waitlist restock notifications delivered.
    pub notifications_sent: usize,

    /// Units left after backorder allocation.
    pub remaining_quantity: u64,
    pub fulfilled_order_ids: Vec<BackorderUuid>,
}

impl ReconciliationSummary {
    /// Summary for a change that added no stock.
    #[must_use]
    pub fn unchanged(key: StockKey) -> Self {
        Self {
            key,
            backorders_fulfilled: 0,
            notifications_sent: 0,
            remaining_quantity: 0,
            fulfilled_order_ids: Vec::new(),
        }
    }
}

/// Summaries for a batch of stock increases, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub summaries: Vec<ReconciliationSummary>,
}

impl BatchSummary {
    #[must_use]
    pub fn backorders_fulfilled(&self) -> usize {
        self.summaries.iter().map(|summary| summary.backorders_fulfilled).sum()
    }

    #[must_use]
    pub fn notifications_sent(&self) -> usize {
        self.summaries.iter().map(|summary| summary.notifications_sent).sum()
    }
}

/// An administrative stock overwrite and its reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockUpdate {
    pub change: StockChange,
    pub reconciliation: ReconciliationSummary,
}

/// Restocked quantities and their reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockSummary {
    pub changes: Vec<StockChange>,
    pub reconciliation: BatchSummary,
}

/// A cancelled backorder and the reconciliation of any stock it released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationSummary {
    pub order: BackorderRecord,
    pub released: Vec<StockChange>,
    pub reconciliation: BatchSummary,
}

/// Result of expiring passed restock dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpirySummary {
    pub expired: Vec<ExpiredSchedule>,
    pub delay_notifications_sent: usize,
}

impl ExpirySummary {
    #[must_use]
    pub fn expired_count(&self) -> usize {
        self.expired.len()
    }
}
