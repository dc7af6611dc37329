//! Check Availability Handler

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use restock_app::domain::stock::records::Availability;

use crate::{
    extensions::*,
    keys::ItemKey,
    stock::{errors::into_status_error, models::StockItemsRequest},
};

/// Item Availability
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AvailabilityItemResponse {
    #[serde(flatten)]
    pub key: ItemKey,

    /// Units asked for
    pub requested: u64,

    /// Units on hand, zero when the item has never been stocked
    pub current_stock: u64,

    /// Whether the item is on sale with enough units
    pub available: bool,
}

impl From<Availability> for AvailabilityItemResponse {
    fn from(availability: Availability) -> Self {
        Self {
            key: availability.key.into(),
            requested: availability.requested,
            current_stock: availability.current_stock,
            available: availability.available,
        }
    }
}

/// Availability Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AvailabilityResponse {
    /// Whether every item can be bought right now
    pub available: bool,

    pub items: Vec<AvailabilityItemResponse>,
}

/// Check Availability Handler
///
/// Reports whether each requested quantity can be sold right now. Nothing is reserved.
#[endpoint(
    tags("stock"),
    summary = "Check Availability",
    responses(
        (status_code = StatusCode::OK, description = "Availability per item"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<StockItemsRequest>,
    depot: &mut Depot,
) -> Result<Json<AvailabilityResponse>, StatusError> {
    let app = depot.app_or_500()?;

    let items: Vec<AvailabilityItemResponse> = app
        .stock
        .check_availability(json.into_inner().into_requests())
        .await
        .map_err(into_status_error)?
        .into_iter()
        .map(AvailabilityItemResponse::from)
        .collect();

    Ok(Json(AvailabilityResponse {
        available: items.iter().all(|item| item.available),
        items,
    }))
}
