//! Reconciliation errors.
//!
//! Only the first step of a coordinator operation can fail it; everything after is logged and
//! skipped.

use thiserror::Error;

use crate::domain::{
    backorders::BackordersServiceError, schedules::SchedulesServiceError,
    stock::StockServiceError,
};

#[derive(Debug, Error)]
pub enum ReconciliationError {
    #[error(transparent)]
    Stock(#[from] StockServiceError),

    #[error(transparent)]
    Backorders(#[from] BackordersServiceError),

    #[error(transparent)]
    Schedules(#[from] SchedulesServiceError),
}
