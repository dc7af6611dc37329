//! List Customer Subscriptions Handler

use std::string::ToString;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::domain::waitlist::records::CustomerSubscription;

use crate::{extensions::*, keys::ItemKey, waitlist::errors::into_status_error};

/// Customer Subscription Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CustomerSubscriptionResponse {
    /// Subscription UUID
    pub uuid: Uuid,

    #[serde(flatten)]
    pub key: ItemKey,

    pub product_name: String,
    pub variant_name: Option<String>,

    /// When the item is expected back, if known
    pub expected_restock_date: Option<String>,

    pub created_at: String,
}

impl From<CustomerSubscription> for CustomerSubscriptionResponse {
    fn from(entry: CustomerSubscription) -> Self {
        Self {
            uuid: entry.subscription.uuid.into_uuid(),
            key: entry.subscription.key.into(),
            product_name: entry.product_name,
            variant_name: entry.variant_name,
            expected_restock_date: entry.expected_restock_date.as_ref().map(ToString::to_string),
            created_at: entry.subscription.created_at.to_string(),
        }
    }
}

/// List Customer Subscriptions Handler
///
/// Returns the active subscriptions for an email address, oldest first.
#[endpoint(tags("waitlist"), summary = "List Customer Subscriptions")]
pub(crate) async fn handler(
    email: QueryParam<String, true>,
    depot: &mut Depot,
) -> Result<Json<Vec<CustomerSubscriptionResponse>>, StatusError> {
    let app = depot.app_or_500()?;

    let subscriptions = app
        .waitlist
        .list_for_customer(&email.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        subscriptions
            .into_iter()
            .map(CustomerSubscriptionResponse::from)
            .collect(),
    ))
}
