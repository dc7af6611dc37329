//! List Pending Backorders Handler

use restock::keys::StockKey;
use salvo::{oapi::extract::QueryParam, prelude::*};
use uuid::Uuid;

use crate::{
    backorders::{errors::into_status_error, models::BackorderResponse},
    extensions::*,
    keys::ItemKey,
};

/// List Pending Backorders Handler
///
/// Returns pending backorders in fulfilment order. Given a product (and optionally a
/// variant), only orders still waiting on that item are listed.
#[endpoint(tags("backorders"), summary = "List Pending Backorders")]
pub(crate) async fn handler(
    product: QueryParam<Uuid, false>,
    variant: QueryParam<Uuid, false>,
    depot: &mut Depot,
) -> Result<Json<Vec<BackorderResponse>>, StatusError> {
    let app = depot.app_or_500()?;

    let key = match (product.into_inner(), variant.into_inner()) {
        (Some(product), variant) => Some(StockKey::from(ItemKey { product, variant })),
        (None, None) => None,
        (None, Some(_)) => {
            return Err(StatusError::bad_request().brief("variant requires a product"));
        }
    };

    let orders = app
        .backorders
        .list_pending(key)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into_iter().map(BackorderResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use restock::keys::{ProductUuid, VariantUuid};
    use restock_app::domain::backorders::records::BackorderUuid;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, make_backorder, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("backorders/pending").get(handler))
    }

    #[tokio::test]
    async fn test_pending_lists_in_priority_order() -> TestResult {
        let key = StockKey::product(ProductUuid::new());
        let mut first = make_backorder(BackorderUuid::new(), key, 2)?;
        let mut second = make_backorder(BackorderUuid::new(), key, 3)?;
        first.priority = 1;
        second.priority = 2;

        let mut mocks = Mocks::default();

        mocks
            .backorders
            .expect_list_pending()
            .once()
            .withf(|key| key.is_none())
            .return_once(move |_| Ok(vec![first, second]));

        let mut res = TestClient::get("http://example.com/backorders/pending")
            .send(&make_service(mocks))
            .await;

        let body: Vec<BackorderResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body.iter().map(|order| order.priority).collect::<Vec<_>>(),
            vec![1, 2]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_filters_by_variant() -> TestResult {
        let product = ProductUuid::new();
        let variant = VariantUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .backorders
            .expect_list_pending()
            .once()
            .withf(move |key| *key == Some(StockKey::variant(product, variant)))
            .return_once(|_| Ok(Vec::new()));

        let res = TestClient::get(format!(
            "http://example.com/backorders/pending?product={product}&variant={variant}"
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_variant_without_product_returns_400() -> TestResult {
        let res = TestClient::get(format!(
            "http://example.com/backorders/pending?variant={}",
            VariantUuid::new()
        ))
        .send(&make_service(Mocks::default()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
