//! Backorder Handlers

pub(crate) mod cancel;
pub(crate) mod create;
pub(crate) mod errors;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod models;
pub(crate) mod pending;
