//! Backorder Data

use restock::keys::StockKey;

use crate::{domain::backorders::records::BackorderUuid, uuids::UserUuid};

/// New Backorder Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBackorder {
    pub uuid: BackorderUuid,
    pub user: UserUuid,

    /// Contact address from the authentication context.
    pub email: String,

    /// ISO 4217 code.
    pub currency: String,
    pub items: Vec<NewBackorderLine>,
}

/// New Backorder Line Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBackorderLine {
    pub key: StockKey,
    pub quantity: u64,

    /// Unit price in minor units.
    pub price: u64,
    pub size: Option<String>,
    pub color: Option<String>,
}
