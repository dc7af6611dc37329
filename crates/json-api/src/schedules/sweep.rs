//! Sweep Expired Schedules Handler

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use restock_app::domain::schedules::records::ExpiredSchedule;

use crate::{extensions::*, keys::ItemKey, reconciliation};

/// Expired Schedule Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ExpiredScheduleResponse {
    #[serde(flatten)]
    pub key: ItemKey,

    /// The date that passed
    pub expected_date: String,
}

impl From<ExpiredSchedule> for ExpiredScheduleResponse {
    fn from(expired: ExpiredSchedule) -> Self {
        Self {
            key: expired.key.into(),
            expected_date: expired.expected_date.to_string(),
        }
    }
}

/// Sweep Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SweepResponse {
    pub success: bool,
    pub message: String,
    pub expired_count: usize,
    pub delay_notifications_sent: usize,
    pub expired: Vec<ExpiredScheduleResponse>,
}

/// Sweep Expired Schedules Handler
///
/// Clears every expected restock date that has passed and tells the owners of affected
/// backorders about the delay.
#[endpoint(
    tags("restock-schedules"),
    summary = "Sweep Expired Schedules",
    responses(
        (status_code = StatusCode::OK, description = "Sweep complete"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<SweepResponse>, StatusError> {
    let app = depot.app_or_500()?;

    let summary = app
        .reconciliation
        .sweep_expired_schedules()
        .await
        .map_err(reconciliation::into_status_error)?;

    Ok(Json(SweepResponse {
        success: true,
        message: format!("{} expected restock dates expired", summary.expired_count()),
        expired_count: summary.expired_count(),
        delay_notifications_sent: summary.delay_notifications_sent,
        expired: summary.expired.into_iter().map(Into::into).collect(),
    }))
}
