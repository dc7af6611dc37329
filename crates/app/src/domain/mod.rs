//! Restock Domain Concerns

pub mod backorders;
pub mod catalog;
pub mod notifications;
pub mod reconciliation;
pub mod schedules;
pub mod stock;
pub mod waitlist;
