//! Unsubscribe Handler

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{extensions::*, keys::ItemKey, waitlist::errors::into_status_error};

/// Unsubscribe Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UnsubscribeRequest {
    pub email: String,

    /// Product UUID
    pub product: Uuid,

    /// Variant UUID
    #[serde(default)]
    pub variant: Option<Uuid>,
}

/// Unsubscribe Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UnsubscribeResponse {
    pub success: bool,
    pub message: String,
}

/// Unsubscribe Handler
///
/// Stops restock notifications for a product or variant.
#[endpoint(
    tags("waitlist"),
    summary = "Unsubscribe",
    responses(
        (status_code = StatusCode::OK, description = "Unsubscribed"),
        (status_code = StatusCode::NOT_FOUND, description = "No active subscription"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<UnsubscribeRequest>,
    depot: &mut Depot,
) -> Result<Json<UnsubscribeResponse>, StatusError> {
    let app = depot.app_or_500()?;
    let request = json.into_inner();

    let key = ItemKey {
        product: request.product,
        variant: request.variant,
    };

    app.waitlist
        .unsubscribe(&request.email, key.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(UnsubscribeResponse {
        success: true,
        message: "Unsubscribed from restock notifications".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use restock::keys::{ProductUuid, StockKey, VariantUuid};
    use restock_app::domain::waitlist::WaitlistServiceError;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("waitlist").delete(handler))
    }

    #[tokio::test]
    async fn test_unsubscribe_success() -> TestResult {
        let product = ProductUuid::new();
        let variant = VariantUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .waitlist
            .expect_unsubscribe()
            .once()
            .withf(move |email, key| {
                email == "shopper@example.com" && *key == StockKey::variant(product, variant)
            })
            .return_once(|_, _| Ok(()));

        let mut res = TestClient::delete("http://example.com/waitlist")
            .json(&json!({
                "email": "shopper@example.com",
                "product": product,
                "variant": variant,
            }))
            .send(&make_service(mocks))
            .await;

        let body: UnsubscribeResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.success, "unsubscribe should succeed");

        Ok(())
    }

    #[tokio::test]
    async fn test_unsubscribe_inactive_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .waitlist
            .expect_unsubscribe()
            .once()
            .return_once(|_, _| Err(WaitlistServiceError::NotFound));

        let res = TestClient::delete("http://example.com/waitlist")
            .json(&json!({ "email": "shopper@example.com", "product": ProductUuid::new() }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
