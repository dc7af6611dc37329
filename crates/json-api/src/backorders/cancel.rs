//! Cancel Backorder Handler

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::domain::backorders::records::BackorderUuid;

use crate::{
    backorders::models::BackorderResponse,
    extensions::*,
    reconciliation::{self, ReconciliationResponse, StockChangeResponse},
};

/// Cancellation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancellationResponse {
    pub success: bool,
    pub message: String,
    pub backorder: BackorderResponse,

    /// Stock handed back from lines that had already been allocated
    pub released: Vec<StockChangeResponse>,

    /// What the released units were used for
    pub reconciliation: Vec<ReconciliationResponse>,
}

/// Cancel Backorder Handler
///
/// Cancels a pending backorder. Stock already set aside for it goes to the next order in
/// line.
#[endpoint(
    tags("backorders"),
    summary = "Cancel Backorder",
    responses(
        (status_code = StatusCode::OK, description = "Backorder cancelled"),
        (status_code = StatusCode::CONFLICT, description = "Backorder is no longer pending"),
        (status_code = StatusCode::NOT_FOUND, description = "Backorder not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CancellationResponse>, StatusError> {
    let app = depot.app_or_500()?;

    let cancelled = app
        .reconciliation
        .cancel_backorder(BackorderUuid::from_uuid(order.into_inner()))
        .await
        .map_err(reconciliation::into_status_error)?;

    Ok(Json(CancellationResponse {
        success: true,
        message: "Backorder cancelled".to_string(),
        backorder: cancelled.order.into(),
        released: cancelled.released.into_iter().map(Into::into).collect(),
        reconciliation: reconciliation::observed_batch(cancelled.reconciliation),
    }))
}
