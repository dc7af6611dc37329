//! Stock Handlers

pub(crate) mod availability;
pub(crate) mod errors;
pub(crate) mod models;
pub(crate) mod reservations;
pub(crate) mod restorations;
pub(crate) mod update;
