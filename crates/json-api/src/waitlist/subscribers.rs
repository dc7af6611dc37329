//! List Subscribers Handler

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::domain::waitlist::records::Subscriber;

use crate::{extensions::*, keys::ItemKey, waitlist::errors::into_status_error};

/// Subscriber Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SubscriberResponse {
    /// Subscription UUID
    pub uuid: Uuid,

    pub email: String,
    pub user_id: Option<Uuid>,
    pub created_at: String,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(subscriber: Subscriber) -> Self {
        Self {
            uuid: subscriber.uuid.into_uuid(),
            email: subscriber.email.into_string(),
            user_id: subscriber.user.map(|user| user.into_uuid()),
            created_at: subscriber.created_at.to_string(),
        }
    }
}

/// List Subscribers Handler
///
/// Returns the active subscribers waiting on a product or variant, in sign-up order.
#[endpoint(tags("waitlist"), summary = "List Subscribers")]
pub(crate) async fn handler(
    product: QueryParam<Uuid, true>,
    variant: QueryParam<Uuid, false>,
    depot: &mut Depot,
) -> Result<Json<Vec<SubscriberResponse>>, StatusError> {
    let app = depot.app_or_500()?;

    let subscribers = app
        .waitlist
        .list_for_product(ItemKey::from_query(product, variant).into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        subscribers
            .into_iter()
            .map(SubscriberResponse::from)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use restock::{
        email::EmailAddress,
        keys::{ProductUuid, StockKey, VariantUuid},
    };
    use restock_app::domain::waitlist::records::SubscriptionUuid;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("waitlist/subscribers").get(handler))
    }

    #[tokio::test]
    async fn test_subscribers_for_variant() -> TestResult {
        let product = ProductUuid::new();
        let variant = VariantUuid::new();
        let first = Subscriber {
            uuid: SubscriptionUuid::new(),
            email: EmailAddress::parse("first@example.com")?,
            user: None,
            created_at: Timestamp::UNIX_EPOCH,
        };

        let mut mocks = Mocks::default();

        mocks
            .waitlist
            .expect_list_for_product()
            .once()
            .withf(move |key| *key == StockKey::variant(product, variant))
            .return_once(move |_| Ok(vec![first]));

        let mut res = TestClient::get(format!(
            "http://example.com/waitlist/subscribers?product={product}&variant={variant}"
        ))
        .send(&make_service(mocks))
        .await;

        let body: Vec<SubscriberResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].email, "first@example.com");

        Ok(())
    }

    #[tokio::test]
    async fn test_subscribers_invalid_product_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/waitlist/subscribers?product=boots")
            .send(&make_service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
