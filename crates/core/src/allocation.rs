//! Allocation
//!
//! The FIFO walk that hands newly available units of one stock key to waiting backorders.
//!
//! Claims are visited in ascending priority. A claim is granted only in full; the first claim
//! that does not fit stops the walk, so a later, smaller order can never jump the queue.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How allocated backorder units interact with publicly available stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Allocated units are removed from `quantity_available` in the same transaction, and the
    /// quantity handed out is capped by what is actually on the shelf.
    #[default]
    DeductStock,

    /// Allocation only updates the backorder ledger; stock counts are left alone.
    LedgerOnly,
}

impl AllocationPolicy {
    /// Configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeductStock => "deduct-stock",
            Self::LedgerOnly => "ledger-only",
        }
    }

    /// Units that may be handed to backorders for an increase of `delta` when `on_hand` units
    /// are currently available.
    #[must_use]
    pub fn allocatable(self, delta: u64, on_hand: u64) -> u64 {
        match self {
            Self::DeductStock => delta.min(on_hand),
            Self::LedgerOnly => delta,
        }
    }

    /// Whether allocation decrements stock.
    #[must_use]
    pub const fn deducts_stock(self) -> bool {
        matches!(self, Self::DeductStock)
    }
}

/// Raised when a policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown allocation policy `{0}`, expected `deduct-stock` or `ledger-only`")]
pub struct UnknownPolicy(pub String);

impl FromStr for AllocationPolicy {
    type Err = UnknownPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "deduct-stock" => Ok(Self::DeductStock),
            "ledger-only" => Ok(Self::LedgerOnly),
            _ => Err(UnknownPolicy(value.to_string())),
        }
    }
}

impl Display for AllocationPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One waiting order's demand for the key being allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim<T> {
    /// Order identity.
    pub order: T,

    /// Fulfilment priority; lower is served first.
    pub priority: i64,

    /// Units the order still needs for this key, summed over its unallocated lines.
    pub quantity: u64,

    /// Whether satisfying this claim leaves the order with no unallocated lines.
    pub completes_order: bool,
}

/// A claim that was satisfied in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant<T> {
    /// Order identity.
    pub order: T,

    /// Units granted.
    pub quantity: u64,

    /// Whether the order is now fully allocated.
    pub completes_order: bool,
}

/// Outcome of one allocation walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation<T> {
    /// Claims granted, in priority order.
    pub granted: Vec<Grant<T>>,

    /// Units left over after the walk stopped.
    pub remaining: u64,

    /// The first claim that did not fit, if the walk stopped early.
    pub blocked_by: Option<T>,
}

impl<T: Copy> Allocation<T> {
    /// Units handed out.
    #[must_use]
    pub fn total_granted(&self) -> u64 {
        self.granted.iter().map(|grant| grant.quantity).sum()
    }

    /// Orders that became fully allocated.
    pub fn completed_orders(&self) -> impl Iterator<Item = T> + '_ {
        self.granted
            .iter()
            .filter(|grant| grant.completes_order)
            .map(|grant| grant.order)
    }
}

/// Errors raised by [`allocate_fifo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// Claims were not supplied in strictly ascending priority.
    #[error("claims must be in strictly ascending priority ({previous} was followed by {next})")]
    OutOfOrder {
        /// Priority of the earlier claim.
        previous: i64,

        /// Priority that followed it.
        next: i64,
    },
}

/// Walk `claims` in order, granting each in full while `available` lasts.
///
/// # Errors
///
/// Returns [`AllocationError::OutOfOrder`] if the claims are not sorted by strictly ascending
/// priority; nothing is granted in that case.
pub fn allocate_fifo<T: Copy>(
    claims: &[Claim<T>],
    available: u64,
) -> Result<Allocation<T>, AllocationError> {
    for pair in claims.windows(2) {
        if let [previous, next] = pair
            && previous.priority >= next.priority
        {
            return Err(AllocationError::OutOfOrder {
                previous: previous.priority,
                next: next.priority,
            });
        }
    }

    let mut remaining = available;
    let mut granted = Vec::new();
    let mut blocked_by = None;

    for claim in claims {
        if claim.quantity > remaining {
            blocked_by = Some(claim.order);
            break;
        }

        remaining -= claim.quantity;

        granted.push(Grant {
            order: claim.order,
            quantity: claim.quantity,
            completes_order: claim.completes_order,
        });
    }

    Ok(Allocation {
        granted,
        remaining,
        blocked_by,
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn claim(order: u32, priority: i64, quantity: u64) -> Claim<u32> {
        Claim {
            order,
            priority,
            quantity,
            completes_order: true,
        }
    }

    #[test]
    fn grants_every_claim_that_fits() -> TestResult {
        let allocation = allocate_fifo(&[claim(1, 1, 2), claim(2, 2, 3)], 5)?;

        assert_eq!(allocation.completed_orders().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(allocation.remaining, 0);
        assert_eq!(allocation.blocked_by, None);

        Ok(())
    }

    #[test]
    fn stops_at_the_first_claim_that_does_not_fit() -> TestResult {
        let allocation = allocate_fifo(&[claim(1, 1, 2), claim(2, 2, 3), claim(3, 3, 1)], 4)?;

        assert_eq!(allocation.completed_orders().collect::<Vec<_>>(), vec![1]);
        assert_eq!(allocation.remaining, 2, "smaller later claims must not skip ahead");
        assert_eq!(allocation.blocked_by, Some(2));

        Ok(())
    }

    #[test]
    fn leftover_units_are_reported() -> TestResult {
        let allocation = allocate_fifo(&[claim(1, 1, 2)], 7)?;

        assert_eq!(allocation.total_granted(), 2);
        assert_eq!(allocation.remaining, 5);

        Ok(())
    }

    #[test]
    fn no_claims_keeps_everything() -> TestResult {
        let allocation = allocate_fifo::<u32>(&[], 3)?;

        assert!(allocation.granted.is_empty());
        assert_eq!(allocation.remaining, 3);

        Ok(())
    }

    #[test]
    fn partial_orders_are_granted_without_completing() -> TestResult {
        let claims = [Claim {
            order: 9_u32,
            priority: 4,
            quantity: 1,
            completes_order: false,
        }];

        let allocation = allocate_fifo(&claims, 1)?;

        assert_eq!(allocation.total_granted(), 1);
        assert_eq!(allocation.completed_orders().count(), 0);

        Ok(())
    }

    #[test]
    fn rejects_unsorted_claims() {
        let result = allocate_fifo(&[claim(1, 5, 1), claim(2, 5, 1)], 3);

        assert_eq!(
            result,
            Err(AllocationError::OutOfOrder {
                previous: 5,
                next: 5
            })
        );
    }

    #[test]
    fn deduct_stock_caps_at_shelf_quantity() {
        assert_eq!(AllocationPolicy::DeductStock.allocatable(5, 3), 3);
        assert_eq!(AllocationPolicy::DeductStock.allocatable(2, 3), 2);
        assert_eq!(AllocationPolicy::LedgerOnly.allocatable(5, 0), 5);
    }

    #[test]
    fn parses_policy_names() -> TestResult {
        assert_eq!(
            "deduct-stock".parse::<AllocationPolicy>()?,
            AllocationPolicy::DeductStock
        );
        assert_eq!(
            "LEDGER_ONLY".parse::<AllocationPolicy>()?,
            AllocationPolicy::LedgerOnly
        );
        assert!("hold".parse::<AllocationPolicy>().is_err());

        Ok(())
    }
}
