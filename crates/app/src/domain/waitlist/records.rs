//! Waitlist Records

use jiff::Timestamp;
use restock::{email::EmailAddress, keys::StockKey};

use crate::uuids::{TypedUuid, UserUuid};

/// Subscription UUID
pub type SubscriptionUuid = TypedUuid<SubscriptionRecord>;

/// Subscription Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRecord {
    pub uuid: SubscriptionUuid,
    pub email: EmailAddress,
    pub key: StockKey,
    pub user: Option<UserUuid>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Outcome of a successful subscribe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscribed {
    /// A new subscription was stored.
    Created(SubscriptionRecord),

    /// A previously cancelled subscription was switched back on.
    Reactivated(SubscriptionRecord),
}

impl Subscribed {
    #[must_use]
    pub fn record(&self) -> &SubscriptionRecord {
        match self {
            Self::Created(record) | Self::Reactivated(record) => record,
        }
    }

    #[must_use]
    pub fn into_record(self) -> SubscriptionRecord {
        match self {
            Self::Created(record) | Self::Reactivated(record) => record,
        }
    }
}

/// A customer's subscription with the details shown on their waitlist page.
#[derive(Debug, Clone)]
pub struct CustomerSubscription {
    pub subscription: SubscriptionRecord,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub expected_restock_date: Option<Timestamp>,
}

/// Someone waiting on a stock key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub uuid: SubscriptionUuid,
    pub email: EmailAddress,
    pub user: Option<UserUuid>,
    pub created_at: Timestamp,
}
