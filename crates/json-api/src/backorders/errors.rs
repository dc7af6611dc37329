//! Errors

use salvo::http::StatusError;
use tracing::error;

use restock_app::domain::backorders::BackordersServiceError;

pub(crate) fn into_status_error(error: BackordersServiceError) -> StatusError {
    match error {
        BackordersServiceError::NotFound => StatusError::not_found().brief("Backorder not found"),
        BackordersServiceError::AlreadyExists => {
            StatusError::conflict().brief("Backorder already exists")
        }
        BackordersServiceError::StockAvailable { .. }
        | BackordersServiceError::InvalidStatus { .. }
        | BackordersServiceError::StockExhausted(_) => {
            StatusError::conflict().brief(error.to_string())
        }
        BackordersServiceError::InvalidItems(_)
        | BackordersServiceError::InvalidEmail(_)
        | BackordersServiceError::Pricing(_)
        | BackordersServiceError::UnknownItem(_) => {
            StatusError::bad_request().brief(error.to_string())
        }
        BackordersServiceError::InvalidReference
        | BackordersServiceError::MissingRequiredData
        | BackordersServiceError::InvalidData
        | BackordersServiceError::InvalidQuantity(_) => {
            StatusError::bad_request().brief("Invalid backorder payload")
        }
        BackordersServiceError::Allocation(source) => {
            error!("backorder allocation failed: {source}");

            StatusError::internal_server_error()
        }
        BackordersServiceError::Sql(source) => {
            error!("backorder storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
