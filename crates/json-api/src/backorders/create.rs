//! Create Backorder Handler

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::{
    domain::backorders::{
        data::{NewBackorder, NewBackorderLine},
        records::BackorderUuid,
    },
    uuids::UserUuid,
};

use crate::{
    backorders::{errors::into_status_error, models::BackorderResponse},
    extensions::*,
    keys::ItemKey,
};

/// Create Backorder Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateBackorderRequest {
    pub uuid: Uuid,
    pub user_id: Uuid,

    /// Contact address for delay and fulfilment notices
    pub email: String,

    /// ISO 4217 currency code
    pub currency: String,

    pub items: Vec<CreateBackorderLineRequest>,
}

/// Create Backorder Line Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateBackorderLineRequest {
    pub product: Uuid,

    #[serde(default)]
    pub variant: Option<Uuid>,

    pub quantity: u64,

    /// Unit price in minor units
    pub price: u64,

    #[serde(default)]
    pub size: Option<String>,

    #[serde(default)]
    pub color: Option<String>,
}

impl From<CreateBackorderRequest> for NewBackorder {
    fn from(request: CreateBackorderRequest) -> Self {
        NewBackorder {
            uuid: BackorderUuid::from_uuid(request.uuid),
            user: UserUuid::from_uuid(request.user_id),
            email: request.email,
            currency: request.currency,
            items: request.items.into_iter().map(NewBackorderLine::from).collect(),
        }
    }
}

impl From<CreateBackorderLineRequest> for NewBackorderLine {
    fn from(line: CreateBackorderLineRequest) -> Self {
        NewBackorderLine {
            key: ItemKey {
                product: line.product,
                variant: line.variant,
            }
            .into(),
            quantity: line.quantity,
            price: line.price,
            size: line.size,
            color: line.color,
        }
    }
}

/// Backorder Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BackorderCreatedResponse {
    pub success: bool,
    pub message: String,
    pub backorder: BackorderResponse,
}

/// Create Backorder Handler
///
/// Accepts an order for items that are out of stock. Rejected when any item can already be
/// bought outright.
#[endpoint(
    tags("backorders"),
    summary = "Create Backorder",
    responses(
        (status_code = StatusCode::CREATED, description = "Backorder created"),
        (status_code = StatusCode::CONFLICT, description = "Item in stock or backorder already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateBackorderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<BackorderCreatedResponse>, StatusError> {
    let app = depot.app_or_500()?;

    let order = app
        .backorders
        .create(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/backorders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(BackorderCreatedResponse {
        success: true,
        message: "Backorder created".to_string(),
        backorder: order.into(),
    }))
}

#[cfg(test)]
mod tests {
    use restock::keys::{ProductUuid, StockKey};
    use restock_app::domain::backorders::BackordersServiceError;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, make_backorder, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("backorders").post(handler))
    }

    #[tokio::test]
    async fn test_create_backorder_success() -> TestResult {
        let uuid = BackorderUuid::new();
        let user = UserUuid::new();
        let product = ProductUuid::new();
        let key = StockKey::product(product);
        let order = make_backorder(uuid, key, 2)?;

        let mut mocks = Mocks::default();

        mocks
            .backorders
            .expect_create()
            .once()
            .withf(move |new| {
                new.uuid == uuid
                    && new.user == user
                    && new.currency == "GBP"
                    && new.items
                        == vec![NewBackorderLine {
                            key,
                            quantity: 2,
                            price: 1_500,
                            size: Some("42".to_string()),
                            color: None,
                        }]
            })
            .return_once(move |_| Ok(order));

        let mut res = TestClient::post("http://example.com/backorders")
            .json(&json!({
                "uuid": uuid,
                "user_id": user,
                "email": "shopper@example.com",
                "currency": "GBP",
                "items": [{ "product": product, "quantity": 2, "price": 1500, "size": "42" }],
            }))
            .send(&make_service(mocks))
            .await;

        let body: BackorderCreatedResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/backorders/{uuid}").as_str()));
        assert_eq!(body.backorder.uuid, uuid.into_uuid());
        assert_eq!(body.backorder.status, "pending");
        assert_eq!(body.backorder.total_amount, 3_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_backorder_for_item_in_stock_returns_409() -> TestResult {
        let product = ProductUuid::new();

        let mut mocks = Mocks::default();

        mocks.backorders.expect_create().once().return_once(move |_| {
            Err(BackordersServiceError::StockAvailable {
                key: StockKey::product(product),
                requested: 2,
                current_stock: 9,
            })
        });

        let res = TestClient::post("http://example.com/backorders")
            .json(&json!({
                "uuid": BackorderUuid::new(),
                "user_id": UserUuid::new(),
                "email": "shopper@example.com",
                "currency": "GBP",
                "items": [{ "product": product, "quantity": 2, "price": 1500 }],
            }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
