//! Errors

use salvo::http::StatusError;
use tracing::error;

use restock_app::domain::waitlist::WaitlistServiceError;

pub(crate) fn into_status_error(error: WaitlistServiceError) -> StatusError {
    match error {
        WaitlistServiceError::AlreadySubscribed => {
            StatusError::conflict().brief("Already subscribed to this item")
        }
        WaitlistServiceError::NotFound => {
            StatusError::not_found().brief("No active subscription for this item")
        }
        WaitlistServiceError::InvalidEmail(_) | WaitlistServiceError::UnknownItem(_) => {
            StatusError::bad_request().brief(error.to_string())
        }
        WaitlistServiceError::InvalidReference
        | WaitlistServiceError::MissingRequiredData
        | WaitlistServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid subscription payload")
        }
        WaitlistServiceError::Sql(source) => {
            error!("waitlist storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
