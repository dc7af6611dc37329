//! Stock service errors.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::TryFromIntError,
};

use restock::keys::{QuantityError, StockKey};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::stock::records::Shortfall;

#[derive(Debug, Error)]
pub enum StockServiceError {
    #[error("stock record already exists")]
    AlreadyExists,

    #[error("stock record not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid quantity value")]
    InvalidQuantity(#[from] TryFromIntError),

    #[error(transparent)]
    InvalidItems(#[from] QuantityError),

    #[error("unknown product or variant: {0}")]
    UnknownItem(StockKey),

    #[error("insufficient stock: {}", Shortfalls(.0))]
    InsufficientStock(Vec<Shortfall>),
}

struct Shortfalls<'a>(&'a [Shortfall]);

impl Display for Shortfalls<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (index, shortfall) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }

            if shortfall.active {
                write!(
                    f,
                    "{} requested {}, {} in stock",
                    shortfall.key, shortfall.requested, shortfall.current_stock
                )?;
            } else {
                write!(f, "{} is not available for sale", shortfall.key)?;
            }
        }

        Ok(())
    }
}

impl From<Error> for StockServiceError {
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
