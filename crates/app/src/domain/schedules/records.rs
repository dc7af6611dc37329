//! Restock Schedule Records

use jiff::Timestamp;
use restock::keys::StockKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockScheduleRecord {
    pub key: StockKey,
    pub expected_date: Option<Timestamp>,
    pub actual_date: Option<Timestamp>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A schedule whose expected date passed without a restock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiredSchedule {
    pub key: StockKey,
    pub expected_date: Timestamp,
}

/// Result of one expiry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: Vec<ExpiredSchedule>,
}

impl SweepReport {
    #[must_use]
    pub fn expired_count(&self) -> usize {
        self.expired.len()
    }
}
