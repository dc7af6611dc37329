//! Notification service errors.

use restock::keys::StockKey;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{
    notifications::transport::MailTransportError, waitlist::records::SubscriptionUuid,
};

#[derive(Debug, Error)]
pub enum NotificationsServiceError {
    #[error("notification not found")]
    NotFound,

    #[error("notification already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("subscription not found")]
    SubscriptionNotFound,

    #[error("subscription is no longer active")]
    InactiveSubscription,

    #[error("unknown product or variant: {0}")]
    UnknownItem(StockKey),

    #[error("reservation window out of range")]
    ReservationWindow(#[from] jiff::Error),

    #[error(transparent)]
    Delivery(#[from] MailTransportError),

    /// The message went out but its notification records were not stored.
    #[error("notification delivered but not recorded")]
    Unrecorded {
        subscriptions: Vec<SubscriptionUuid>,
        #[source]
        source: Box<NotificationsServiceError>,
    },
}

impl From<Error> for NotificationsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
