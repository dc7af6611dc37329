//! Set Stock Handler

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    reconciliation::{self, ReconciliationResponse},
    stock::models::StockItemRequest,
};

/// Set Stock Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SetStockResponse {
    pub success: bool,
    pub message: String,

    /// Level before the update
    pub previous: u64,

    /// Level after the update
    pub current: u64,

    /// What any added units were used for
    pub reconciliation: ReconciliationResponse,
}

/// Set Stock Handler
///
/// Overwrites the stock level for an item. An increase is handed to waiting backorders
/// before the waitlist is told.
#[endpoint(
    tags("stock"),
    summary = "Set Stock",
    responses(
        (status_code = StatusCode::OK, description = "Stock level updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<StockItemRequest>,
    depot: &mut Depot,
) -> Result<Json<SetStockResponse>, StatusError> {
    let app = depot.app_or_500()?;
    let item = json.into_inner();

    let update = app
        .reconciliation
        .set_stock(item.key(), item.quantity)
        .await
        .map_err(reconciliation::into_status_error)?;

    Ok(Json(SetStockResponse {
        success: true,
        message: "Stock level updated".to_string(),
        previous: update.change.previous,
        current: update.change.current,
        reconciliation: reconciliation::observed(update.reconciliation),
    }))
}

#[cfg(test)]
mod tests {
    use restock::keys::{ProductUuid, StockKey, VariantUuid};
    use restock_app::domain::{
        reconciliation::records::{ReconciliationSummary, StockUpdate},
        stock::records::StockChange,
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("stock").put(handler))
    }

    #[tokio::test]
    async fn test_set_stock_returns_previous_level() -> TestResult {
        let product = ProductUuid::new();
        let variant = VariantUuid::new();
        let key = StockKey::variant(product, variant);

        let mut mocks = Mocks::default();

        mocks
            .reconciliation
            .expect_set_stock()
            .once()
            .withf(move |k, quantity| *k == key && *quantity == 2)
            .return_once(move |_, _| {
                Ok(StockUpdate {
                    change: StockChange {
                        key,
                        previous: 7,
                        current: 2,
                    },
                    reconciliation: ReconciliationSummary::unchanged(key),
                })
            });

        let mut res = TestClient::put("http://example.com/stock")
            .json(&json!({ "product": product, "variant": variant, "quantity": 2 }))
            .send(&make_service(mocks))
            .await;

        let body: SetStockResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.previous, 7);
        assert_eq!(body.current, 2);
        assert_eq!(body.reconciliation.backorders_fulfilled, 0);
        assert_eq!(body.reconciliation.key.variant, Some(variant.into_uuid()));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_stock_rejects_negative_quantity() -> TestResult {
        let res = TestClient::put("http://example.com/stock")
            .json(&json!({ "product": ProductUuid::new(), "quantity": -1 }))
            .send(&make_service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
