//! Backorder Status

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of a backorder.
///
/// `Pending` moves to `Processing` once every line has been allocated, or to `Cancelled` on
/// request. `Processing` moves to `Fulfilled` when the order ships. `Cancelled` and `Fulfilled`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackorderStatus {
    /// Waiting for stock.
    Pending,

    /// Every line allocated; awaiting shipment.
    Processing,

    /// Cancelled by the customer or an operator.
    Cancelled,

    /// Shipped.
    Fulfilled,
}

impl BackorderStatus {
    /// Storage / wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Cancelled => "cancelled",
            Self::Fulfilled => "fulfilled",
        }
    }

    /// Whether a cancellation request is honoured in this state.
    #[must_use]
    pub const fn can_cancel(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Fulfilled)
    }
}

/// Raised when a stored status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown backorder status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BackorderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "cancelled" => Ok(Self::Cancelled),
            "fulfilled" => Ok(Self::Fulfilled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl Display for BackorderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
