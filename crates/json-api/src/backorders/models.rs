//! Backorder response bodies.

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::domain::backorders::records::{BackorderLineItemRecord, BackorderRecord};

use crate::keys::ItemKey;

/// Backorder Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BackorderResponse {
    pub uuid: Uuid,
    pub user_id: Uuid,
    pub email: String,

    /// One of `pending`, `processing`, `cancelled` or `fulfilled`
    pub status: String,

    /// Order total in minor units
    pub total_amount: u64,

    pub currency: String,

    /// Fulfilment position; lower is served first
    pub priority: i64,

    pub expected_fulfillment_date: Option<String>,
    pub items: Vec<BackorderLineResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BackorderRecord> for BackorderResponse {
    fn from(order: BackorderRecord) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            user_id: order.user.into_uuid(),
            email: order.email.into_string(),
            status: order.status.to_string(),
            total_amount: order.total_amount,
            currency: order.currency,
            priority: order.priority,
            expected_fulfillment_date: order
                .expected_fulfillment_date
                .as_ref()
                .map(ToString::to_string),
            items: order.items.into_iter().map(BackorderLineResponse::from).collect(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Backorder Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BackorderLineResponse {
    pub uuid: Uuid,

    #[serde(flatten)]
    pub key: ItemKey,

    pub quantity: u64,

    /// Unit price in minor units
    pub price: u64,

    pub size: Option<String>,
    pub color: Option<String>,

    /// When stock was set aside for this line
    pub allocated_at: Option<String>,
}

impl From<BackorderLineItemRecord> for BackorderLineResponse {
    fn from(line: BackorderLineItemRecord) -> Self {
        Self {
            uuid: line.uuid.into_uuid(),
            key: line.key.into(),
            quantity: line.quantity,
            price: line.price,
            size: line.size,
            color: line.color,
            allocated_at: line.allocated_at.as_ref().map(ToString::to_string),
        }
    }
}
