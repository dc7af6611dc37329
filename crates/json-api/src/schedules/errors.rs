//! Errors

use salvo::http::StatusError;
use tracing::error;

use restock_app::domain::schedules::SchedulesServiceError;

pub(crate) fn into_status_error(error: SchedulesServiceError) -> StatusError {
    match error {
        SchedulesServiceError::NotFound => {
            StatusError::not_found().brief("Restock schedule not found")
        }
        SchedulesServiceError::AlreadyExists => {
            StatusError::conflict().brief("Restock schedule already exists")
        }
        SchedulesServiceError::InvalidDate(_) | SchedulesServiceError::UnknownItem(_) => {
            StatusError::bad_request().brief(error.to_string())
        }
        SchedulesServiceError::InvalidReference
        | SchedulesServiceError::MissingRequiredData
        | SchedulesServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid restock schedule payload")
        }
        SchedulesServiceError::Sql(source) => {
            error!("restock schedule storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
