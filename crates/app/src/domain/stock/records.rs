//! Stock Records

use jiff::Timestamp;
use restock::keys::StockKey;

/// Stock Record
#[derive(Debug, Clone)]
pub struct StockRecord {
    pub key: StockKey,
    pub quantity_available: u64,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StockRecord {
    /// Whether `quantity` units can be sold right now.
    #[must_use]
    pub fn can_supply(&self, quantity: u64) -> bool {
        self.active && self.quantity_available >= quantity
    }
}

/// Availability of one requested item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub key: StockKey,
    pub requested: u64,
    pub current_stock: u64,
    pub available: bool,
}

/// An item a reservation could not be satisfied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub key: StockKey,
    pub requested: u64,
    pub current_stock: u64,
    pub active: bool,
}

/// Stock level of a key before and after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub key: StockKey,
    pub previous: u64,
    pub current: u64,
}

impl StockChange {
    /// Whether the change added stock.
    #[must_use]
    pub fn is_increase(&self) -> bool {
        self.current > self.previous
    }
}
