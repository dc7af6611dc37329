//! Backorder service errors.

use std::num::TryFromIntError;

use restock::{
    allocation::AllocationError,
    email::EmailError,
    keys::{QuantityError, StockKey},
    pricing::PricingError,
    status::BackorderStatus,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackordersServiceError {
    #[error("backorder not found")]
    NotFound,

    #[error("backorder already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("quantity or price out of range")]
    InvalidQuantity(#[from] TryFromIntError),

    #[error(transparent)]
    InvalidItems(#[from] QuantityError),

    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("unknown product or variant: {0}")]
    UnknownItem(StockKey),

    #[error("{key} has {current_stock} in stock, enough for the {requested} requested")]
    StockAvailable {
        key: StockKey,
        requested: u64,
        current_stock: u64,
    },

    #[error("backorder is {status}")]
    InvalidStatus { status: BackorderStatus },

    #[error("stock for {0} changed during allocation")]
    StockExhausted(StockKey),
}

impl From<Error> for BackordersServiceError {
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
