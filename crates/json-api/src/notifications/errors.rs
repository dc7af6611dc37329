//! Errors

use salvo::http::StatusError;
use tracing::error;

use restock_app::domain::notifications::NotificationsServiceError;

pub(crate) fn into_status_error(error: NotificationsServiceError) -> StatusError {
    match error {
        NotificationsServiceError::NotFound => {
            StatusError::not_found().brief("Notification not found")
        }
        NotificationsServiceError::SubscriptionNotFound => {
            StatusError::not_found().brief("Subscription not found")
        }
        NotificationsServiceError::InactiveSubscription => {
            StatusError::conflict().brief("Subscription is no longer active")
        }
        NotificationsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Notification already exists")
        }
        NotificationsServiceError::UnknownItem(_) => {
            StatusError::bad_request().brief(error.to_string())
        }
        NotificationsServiceError::InvalidReference
        | NotificationsServiceError::MissingRequiredData
        | NotificationsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid notification payload")
        }
        NotificationsServiceError::ReservationWindow(source) => {
            error!("failed to compute reservation window: {source}");

            StatusError::internal_server_error()
        }
        NotificationsServiceError::Delivery(source) => {
            error!("failed to deliver notification: {source}");

            StatusError::internal_server_error()
        }
        NotificationsServiceError::Unrecorded { source, .. } => {
            error!("notification delivered but not recorded: {source}");

            StatusError::internal_server_error()
        }
        NotificationsServiceError::Sql(source) => {
            error!("notification storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
