//! Restore Stock Handler

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    reconciliation::{self, ReconciliationResponse, StockChangeResponse},
    stock::models::StockItemsRequest,
};

/// Restoration Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RestorationResponse {
    pub success: bool,
    pub message: String,

    /// New stock level per item
    pub changes: Vec<StockChangeResponse>,

    /// What the added units were used for, per item
    pub reconciliation: Vec<ReconciliationResponse>,
}

/// Restore Stock Handler
///
/// Adds units back to stock (returns, cancelled checkouts, deliveries), then hands them to
/// waiting backorders and notifies the waitlist.
#[endpoint(
    tags("stock"),
    summary = "Restore Stock",
    responses(
        (status_code = StatusCode::OK, description = "Stock restored and reconciled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<StockItemsRequest>,
    depot: &mut Depot,
) -> Result<Json<RestorationResponse>, StatusError> {
    let app = depot.app_or_500()?;

    let summary = app
        .reconciliation
        .restock(json.into_inner().into_requests())
        .await
        .map_err(reconciliation::into_status_error)?;

    Ok(Json(RestorationResponse {
        success: true,
        message: "Stock restored".to_string(),
        changes: summary.changes.into_iter().map(Into::into).collect(),
        reconciliation: reconciliation::observed_batch(summary.reconciliation),
    }))
}
