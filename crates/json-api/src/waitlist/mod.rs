//! Waitlist Handlers

pub(crate) mod errors;
pub(crate) mod index;
pub(crate) mod subscribe;
pub(crate) mod subscribers;
pub(crate) mod unsubscribe;
