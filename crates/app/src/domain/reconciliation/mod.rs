//! Inventory Reconciliation

pub mod errors;
pub mod records;
pub mod service;

pub use errors::ReconciliationError;
pub use service::*;
