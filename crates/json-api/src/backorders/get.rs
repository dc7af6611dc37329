//! Get Backorder Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use restock_app::domain::backorders::records::BackorderUuid;

use crate::{
    backorders::{errors::into_status_error, models::BackorderResponse},
    extensions::*,
};

/// Get Backorder Handler
///
/// Returns a backorder with its lines.
#[endpoint(
    tags("backorders"),
    summary = "Get Backorder",
    responses(
        (status_code = StatusCode::OK, description = "Backorder"),
        (status_code = StatusCode::NOT_FOUND, description = "Backorder not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BackorderResponse>, StatusError> {
    let app = depot.app_or_500()?;

    let order = app
        .backorders
        .get_status(BackorderUuid::from_uuid(order.into_inner()))
        .await
        .map_err(into_status_error)?
        .or_404("Backorder not found")?;

    Ok(Json(order.into()))
}
