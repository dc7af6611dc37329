//! Restock Schedule Handlers

pub(crate) mod errors;
pub(crate) mod sweep;
pub(crate) mod update;
