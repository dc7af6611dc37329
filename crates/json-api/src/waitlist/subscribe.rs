//! Subscribe Handler

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::{
    domain::waitlist::{data::NewSubscription, records::Subscribed},
    uuids::UserUuid,
};

use crate::{extensions::*, keys::ItemKey, waitlist::errors::into_status_error};

/// Subscribe Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SubscribeRequest {
    /// Address to notify
    pub email: String,

    /// Product UUID
    pub product: Uuid,

    /// Variant UUID
    #[serde(default)]
    pub variant: Option<Uuid>,

    /// Signed-in shopper, if any
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl From<SubscribeRequest> for NewSubscription {
    fn from(request: SubscribeRequest) -> Self {
        NewSubscription {
            email: request.email,
            key: ItemKey {
                product: request.product,
                variant: request.variant,
            }
            .into(),
            user: request.user_id.map(UserUuid::from_uuid),
        }
    }
}

/// Subscribe Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SubscribeResponse {
    pub success: bool,
    pub message: String,

    /// Subscription UUID
    pub subscription: Uuid,

    /// Whether a cancelled subscription was switched back on
    pub reactivated: bool,
}

/// Subscribe Handler
///
/// Adds an email address to the waitlist for a product or variant.
#[endpoint(
    tags("waitlist"),
    summary = "Subscribe",
    responses(
        (status_code = StatusCode::CREATED, description = "Subscribed"),
        (status_code = StatusCode::OK, description = "Cancelled subscription reactivated"),
        (status_code = StatusCode::CONFLICT, description = "Already subscribed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<SubscribeRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SubscribeResponse>, StatusError> {
    let app = depot.app_or_500()?;

    let subscribed = app
        .waitlist
        .subscribe(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    let (status, message, reactivated) = match &subscribed {
        Subscribed::Created(_) => (StatusCode::CREATED, "Subscribed to restock notifications", false),
        Subscribed::Reactivated(_) => (StatusCode::OK, "Subscription reactivated", true),
    };

    res.status_code(status);

    Ok(Json(SubscribeResponse {
        success: true,
        message: message.to_string(),
        subscription: subscribed.record().uuid.into_uuid(),
        reactivated,
    }))
}
