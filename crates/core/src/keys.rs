//! Stock Keys
//!
//! Every stock-keeping unit is either a bare product or a product variant. Modelling this as a
//! tagged enum keeps "no variant" out of nullable composite keys: storage derives a non-null
//! `variant_key` from [`StockKey::variant_key`], with the nil uuid standing for "bare product".

use std::fmt::{Display, Formatter, Result as FmtResult};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ids::TypedUuid;

/// Product identity marker.
#[derive(Debug)]
pub struct Product;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Product variant identity marker.
#[derive(Debug)]
pub struct Variant;

/// Variant UUID
pub type VariantUuid = TypedUuid<Variant>;

/// Identity of a stock-keeping unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockKey {
    /// A product sold without variants.
    Product {
        /// Product identifier.
        product: ProductUuid,
    },

    /// A specific variant of a product.
    Variant {
        /// Product identifier.
        product: ProductUuid,

        /// Variant identifier.
        variant: VariantUuid,
    },
}

impl StockKey {
    /// Key for a bare product.
    #[must_use]
    pub const fn product(product: ProductUuid) -> Self {
        Self::Product { product }
    }

    /// Key for a product variant.
    #[must_use]
    pub const fn variant(product: ProductUuid, variant: VariantUuid) -> Self {
        Self::Variant { product, variant }
    }

    /// Build a key from a product and an optional variant.
    #[must_use]
    pub const fn from_parts(product: ProductUuid, variant: Option<VariantUuid>) -> Self {
        match variant {
            Some(variant) => Self::Variant { product, variant },
            None => Self::Product { product },
        }
    }

    /// Build a key from the raw storage columns.
    #[must_use]
    pub fn from_storage(product: Uuid, variant: Option<Uuid>) -> Self {
        Self::from_parts(product.into(), variant.map(VariantUuid::from_uuid))
    }

    /// The product this key belongs to.
    #[must_use]
    pub const fn product_uuid(&self) -> ProductUuid {
        match self {
            Self::Product { product } | Self::Variant { product, .. } => *product,
        }
    }

    /// The variant, when this key names one.
    #[must_use]
    pub const fn variant_uuid(&self) -> Option<VariantUuid> {
        match self {
            Self::Product { .. } => None,
            Self::Variant { variant, .. } => Some(*variant),
        }
    }

    /// Non-null discriminator used in composite storage keys; nil for a bare product.
    #[must_use]
    pub const fn variant_key(&self) -> Uuid {
        match self {
            Self::Product { .. } => Uuid::nil(),
            Self::Variant { variant, .. } => variant.into_uuid(),
        }
    }

    /// `(product, variant_key)`, the order in which storage rows for several keys are locked.
    #[must_use]
    pub const fn storage_order(&self) -> (Uuid, Uuid) {
        (self.product_uuid().into_uuid(), self.variant_key())
    }
}

impl Display for StockKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Product { product } => write!(f, "product/{product}"),
            Self::Variant { product, variant } => {
                write!(f, "product/{product}/variant/{variant}")
            }
        }
    }
}

/// Errors raised while merging a batch of per-key quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// The batch contained no items.
    #[error("at least one item is required")]
    Empty,

    /// An item asked for zero units.
    #[error("quantity for {0} must be greater than zero")]
    Zero(StockKey),

    /// Summing the quantities for a key overflowed.
    #[error("combined quantity for {0} is too large")]
    Overflow(StockKey),
}

/// Sum quantities per key and return them in [`StockKey::storage_order`], the order in which
/// their rows are locked.
///
/// # Errors
///
/// Returns a [`QuantityError`] for an empty batch, a zero quantity or an overflowing sum.
pub fn merge_quantities<I>(items: I) -> Result<Vec<(StockKey, u64)>, QuantityError>
where
    I: IntoIterator<Item = (StockKey, u64)>,
{
    let mut merged: FxHashMap<StockKey, u64> = FxHashMap::default();

    for (key, quantity) in items {
        if quantity == 0 {
            return Err(QuantityError::Zero(key));
        }

        let total = merged.entry(key).or_insert(0);

        *total = total
            .checked_add(quantity)
            .ok_or(QuantityError::Overflow(key))?;
    }

    if merged.is_empty() {
        return Err(QuantityError::Empty);
    }

    let mut merged: Vec<(StockKey, u64)> = merged.into_iter().collect();

    merged.sort_by_key(|(key, _)| key.storage_order());

    Ok(merged)
}
