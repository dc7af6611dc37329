//! Restock
//!
//! Restock is the allocation and notification-planning engine behind backorders, waitlists and
//! restock schedules. It performs no I/O: storage, transactions and delivery live in
//! `restock-app`, which feeds this crate plain values and persists what it decides.

pub mod allocation;
pub mod consolidation;
pub mod email;
pub mod funnel;
pub mod ids;
pub mod keys;
pub mod prelude;
pub mod pricing;
pub mod schedule;
pub mod status;
