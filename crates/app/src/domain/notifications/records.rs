//! Notification Records

use jiff::Timestamp;

use crate::{domain::waitlist::records::SubscriptionUuid, uuids::TypedUuid};

/// Notification UUID
pub type NotificationUuid = TypedUuid<RestockNotificationRecord>;

/// A delivered restock notice and how the recipient responded to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockNotificationRecord {
    pub uuid: NotificationUuid,
    pub subscription: SubscriptionUuid,
    pub sent_at: Timestamp,
    pub email_opened: bool,
    pub link_clicked: bool,
    pub purchase_completed: bool,
    pub reservation_token: String,
    pub reservation_expires_at: Timestamp,
}

/// Funnel step recorded against a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    Opened,
    Clicked,
    Purchased,
}
