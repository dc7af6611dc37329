//! List Customer Backorders Handler

use salvo::{oapi::extract::QueryParam, prelude::*};
use uuid::Uuid;

use restock_app::uuids::UserUuid;

use crate::{
    backorders::{errors::into_status_error, models::BackorderResponse},
    extensions::*,
};

/// List Customer Backorders Handler
///
/// Returns a shopper's backorders, newest first.
#[endpoint(tags("backorders"), summary = "List Customer Backorders")]
pub(crate) async fn handler(
    user_id: QueryParam<Uuid, true>,
    depot: &mut Depot,
) -> Result<Json<Vec<BackorderResponse>>, StatusError> {
    let app = depot.app_or_500()?;

    let orders = app
        .backorders
        .list_for_customer(UserUuid::from_uuid(user_id.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into_iter().map(BackorderResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use restock::keys::{ProductUuid, StockKey};
    use restock_app::domain::backorders::records::BackorderUuid;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, make_backorder, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("backorders").get(handler))
    }

    #[tokio::test]
    async fn test_list_for_customer() -> TestResult {
        let user = UserUuid::new();
        let mut order = make_backorder(BackorderUuid::new(), StockKey::product(ProductUuid::new()), 1)?;
        order.user = user;
        let uuid = order.uuid;

        let mut mocks = Mocks::default();

        mocks
            .backorders
            .expect_list_for_customer()
            .once()
            .withf(move |u| *u == user)
            .return_once(move |_| Ok(vec![order]));

        let mut res = TestClient::get(format!("http://example.com/backorders?user_id={user}"))
            .send(&make_service(mocks))
            .await;

        let body: Vec<BackorderResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].uuid, uuid.into_uuid());
        assert_eq!(body[0].user_id, user.into_uuid());

        Ok(())
    }
}
