//! Notification Analytics Handler

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use restock::funnel::FunnelRates;

use crate::{extensions::*, notifications::errors::into_status_error};

/// Funnel Analytics Response
///
/// Rates are percentages with two decimal places.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AnalyticsResponse {
    pub total_sent: u64,
    pub open_rate: String,
    pub click_rate: String,
    pub conversion_rate: String,
}

impl From<FunnelRates> for AnalyticsResponse {
    fn from(rates: FunnelRates) -> Self {
        Self {
            total_sent: rates.total_sent,
            open_rate: rates.open_rate.to_string(),
            click_rate: rates.click_rate.to_string(),
            conversion_rate: rates.conversion_rate.to_string(),
        }
    }
}

/// Notification Analytics Handler
///
/// Open, click and conversion rates over every restock notification sent.
#[endpoint(tags("notifications"), summary = "Notification Analytics")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<AnalyticsResponse>, StatusError> {
    let app = depot.app_or_500()?;

    let rates = app
        .notifications
        .analytics()
        .await
        .map_err(into_status_error)?;

    Ok(Json(rates.into()))
}
