//! Set Expected Restock Date Handler

use std::string::ToString;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::domain::schedules::records::RestockScheduleRecord;

use crate::{extensions::*, keys::ItemKey, schedules::errors::into_status_error};

/// Set Expected Restock Date Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SetScheduleRequest {
    pub product: Uuid,

    #[serde(default)]
    pub variant: Option<Uuid>,

    /// RFC 3339 timestamp in the future; null clears the expectation
    #[serde(default)]
    pub expected_date: Option<String>,

    /// Replaces existing notes when present
    #[serde(default)]
    pub notes: Option<String>,
}

/// Restock Schedule Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ScheduleResponse {
    #[serde(flatten)]
    pub key: ItemKey,

    pub expected_date: Option<String>,
    pub actual_date: Option<String>,
    pub notes: Option<String>,
    pub updated_at: String,
}

impl From<RestockScheduleRecord> for ScheduleResponse {
    fn from(schedule: RestockScheduleRecord) -> Self {
        Self {
            key: schedule.key.into(),
            expected_date: schedule.expected_date.as_ref().map(ToString::to_string),
            actual_date: schedule.actual_date.as_ref().map(ToString::to_string),
            notes: schedule.notes,
            updated_at: schedule.updated_at.to_string(),
        }
    }
}

/// Set Schedule Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SetScheduleResponse {
    pub success: bool,
    pub message: String,
    pub schedule: ScheduleResponse,
}

/// Set Expected Restock Date Handler
///
/// Records when an out-of-stock item is expected back, or clears the expectation.
#[endpoint(
    tags("restock-schedules"),
    summary = "Set Expected Restock Date",
    responses(
        (status_code = StatusCode::OK, description = "Schedule updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<SetScheduleRequest>,
    depot: &mut Depot,
) -> Result<Json<SetScheduleResponse>, StatusError> {
    let app = depot.app_or_500()?;
    let request = json.into_inner();

    let expected_date = request
        .expected_date
        .as_deref()
        .map(str::parse::<Timestamp>)
        .transpose()
        .or_400("could not parse \"expected_date\"")?;

    let key = ItemKey {
        product: request.product,
        variant: request.variant,
    };

    let schedule = app
        .schedules
        .set_expected(key.into(), expected_date, request.notes)
        .await
        .map_err(into_status_error)?;

    let message = if expected_date.is_some() {
        "Expected restock date set"
    } else {
        "Expected restock date cleared"
    };

    Ok(Json(SetScheduleResponse {
        success: true,
        message: message.to_string(),
        schedule: schedule.into(),
    }))
}
