//! Notification Handlers

pub(crate) mod analytics;
pub(crate) mod errors;
pub(crate) mod tracking;
