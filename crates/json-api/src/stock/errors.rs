//! Errors

use salvo::http::StatusError;
use tracing::error;

use restock_app::domain::stock::StockServiceError;

pub(crate) fn into_status_error(error: StockServiceError) -> StatusError {
    match error {
        StockServiceError::InsufficientStock(_) => {
            StatusError::conflict().brief(error.to_string())
        }
        StockServiceError::AlreadyExists => {
            StatusError::conflict().brief("Stock record already exists")
        }
        StockServiceError::NotFound => StatusError::not_found().brief("Stock record not found"),
        StockServiceError::UnknownItem(_) | StockServiceError::InvalidItems(_) => {
            StatusError::bad_request().brief(error.to_string())
        }
        StockServiceError::InvalidReference
        | StockServiceError::MissingRequiredData
        | StockServiceError::InvalidData
        | StockServiceError::InvalidQuantity(_) => {
            StatusError::bad_request().brief("Invalid stock payload")
        }
        StockServiceError::Sql(source) => {
            error!("stock storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use restock::keys::{ProductUuid, QuantityError, StockKey};
    use restock_app::domain::stock::records::Shortfall;
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn shortfalls_are_conflicts_that_carry_the_count() {
        let key = StockKey::product(ProductUuid::new());

        let error = into_status_error(StockServiceError::InsufficientStock(vec![Shortfall {
            key,
            requested: 4,
            current_stock: 1,
            active: true,
        }]));

        assert_eq!(error.code, StatusCode::CONFLICT);
        assert!(error.brief.contains("requested 4, 1 in stock"), "brief was {}", error.brief);
    }

    #[test]
    fn empty_batches_are_bad_requests() {
        let error = into_status_error(StockServiceError::InvalidItems(QuantityError::Empty));

        assert_eq!(error.code, StatusCode::BAD_REQUEST);
    }
}
