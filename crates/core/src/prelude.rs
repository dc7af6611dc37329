//! Restock prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{
        Allocation, AllocationError, AllocationPolicy, Claim, Grant, UnknownPolicy, allocate_fifo,
    },
    consolidation::{Dispatch, RecipientBatch, group_by_recipient, plan_dispatches},
    email::{EmailAddress, EmailError},
    funnel::{FunnelCounts, FunnelRates},
    ids::TypedUuid,
    keys::{Product, ProductUuid, QuantityError, StockKey, Variant, VariantUuid, merge_quantities},
    pricing::{PricingError, find_currency, order_total},
    schedule::{
        ScheduleError, append_note, expiry_note, is_expired, latest_expected, validate_expected_date,
    },
    status::{BackorderStatus, UnknownStatus},
};
