//! Reserve Stock Handler

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    stock::{errors::into_status_error, models::StockItemsRequest},
};

/// Reservation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReservationResponse {
    pub success: bool,
    pub message: String,
}

/// Reserve Stock Handler
///
/// Removes every requested quantity from stock, or nothing when any item falls short.
#[endpoint(
    tags("stock"),
    summary = "Reserve Stock",
    responses(
        (status_code = StatusCode::OK, description = "Stock reserved"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<StockItemsRequest>,
    depot: &mut Depot,
) -> Result<Json<ReservationResponse>, StatusError> {
    let app = depot.app_or_500()?;

    app.stock
        .reserve(json.into_inner().into_requests())
        .await
        .map_err(into_status_error)?;

    Ok(Json(ReservationResponse {
        success: true,
        message: "Stock reserved".to_string(),
    }))
}
