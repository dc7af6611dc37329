//! Stock Data

use restock::keys::StockKey;

/// A quantity of one stock key, as requested by checkout or returned by a restock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRequest {
    pub key: StockKey,
    pub quantity: u64,
}

impl StockRequest {
    #[must_use]
    pub const fn new(key: StockKey, quantity: u64) -> Self {
        Self { key, quantity }
    }
}
