//! Waitlist Data

use restock::keys::StockKey;

use crate::uuids::UserUuid;

/// New Subscription Data
///
/// `email` is taken as supplied; the service validates and normalises it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub email: String,
    pub key: StockKey,
    pub user: Option<UserUuid>,
}
