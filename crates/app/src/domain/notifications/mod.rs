//! Notification Dispatcher

pub mod errors;
pub mod messages;
pub mod records;
pub(crate) mod repository;
pub mod service;
pub mod settings;
pub mod tokens;
pub mod transport;

pub use errors::NotificationsServiceError;
pub use service::*;
