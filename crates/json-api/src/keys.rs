//! Item references shared by request and response bodies.

use restock::keys::{ProductUuid, StockKey, VariantUuid};
use salvo::oapi::{ToSchema, extract::QueryParam};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product, or one of its variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct ItemKey {
    /// Product UUID
    pub product: Uuid,

    /// Variant UUID, absent for products sold without variants
    #[serde(default)]
    pub variant: Option<Uuid>,
}

impl ItemKey {
    /// Key built from `?product=&variant=` query parameters.
    pub(crate) fn from_query(product: QueryParam<Uuid, true>, variant: QueryParam<Uuid, false>) -> Self {
        Self {
            product: product.into_inner(),
            variant: variant.into_inner(),
        }
    }
}

impl From<ItemKey> for StockKey {
    fn from(key: ItemKey) -> Self {
        StockKey::from_parts(
            ProductUuid::from_uuid(key.product),
            key.variant.map(VariantUuid::from_uuid),
        )
    }
}

impl From<StockKey> for ItemKey {
    fn from(key: StockKey) -> Self {
        Self {
            product: key.product_uuid().into_uuid(),
            variant: key.variant_uuid().map(VariantUuid::into_uuid),
        }
    }
}
