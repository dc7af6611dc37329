//! Stock request bodies.

use restock::keys::StockKey;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::domain::stock::data::StockRequest;

use crate::keys::ItemKey;

/// A quantity of one product or variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub(crate) struct StockItemRequest {
    /// Product UUID
    pub product: Uuid,

    /// Variant UUID, absent for products sold without variants
    #[serde(default)]
    pub variant: Option<Uuid>,

    /// Number of units
    pub quantity: u64,
}

impl StockItemRequest {
    pub(crate) fn key(&self) -> StockKey {
        ItemKey {
            product: self.product,
            variant: self.variant,
        }
        .into()
    }
}

impl From<StockItemRequest> for StockRequest {
    fn from(item: StockItemRequest) -> Self {
        StockRequest::new(item.key(), item.quantity)
    }
}

/// A batch of stock quantities.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct StockItemsRequest {
    pub items: Vec<StockItemRequest>,
}

impl StockItemsRequest {
    pub(crate) fn into_requests(self) -> Vec<StockRequest> {
        self.items.into_iter().map(StockRequest::from).collect()
    }
}
