//! App Router

use salvo::Router;

use crate::{backorders, notifications, schedules, stock, waitlist};

pub fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("stock")
                .put(stock::update::handler)
                .push(Router::with_path("availability").post(stock::availability::handler))
                .push(Router::with_path("reservations").post(stock::reservations::handler))
                .push(Router::with_path("restorations").post(stock::restorations::handler)),
        )
        .push(
            Router::with_path("waitlist")
                .get(waitlist::index::handler)
                .post(waitlist::subscribe::handler)
                .delete(waitlist::unsubscribe::handler)
                .push(Router::with_path("subscribers").get(waitlist::subscribers::handler)),
        )
        .push(
            Router::with_path("backorders")
                .get(backorders::index::handler)
                .post(backorders::create::handler)
                .push(Router::with_path("pending").get(backorders::pending::handler))
                .push(
                    Router::with_path("{order}")
                        .get(backorders::get::handler)
                        .push(Router::with_path("cancel").post(backorders::cancel::handler)),
                ),
        )
        .push(
            Router::with_path("restock-schedules")
                .put(schedules::update::handler)
                .push(Router::with_path("sweep").post(schedules::sweep::handler)),
        )
        .push(
            Router::with_path("notifications")
                .push(Router::with_path("analytics").get(notifications::analytics::handler))
                .push(
                    Router::with_path("{notification}")
                        .push(Router::with_path("opened").post(notifications::tracking::opened))
                        .push(Router::with_path("clicked").post(notifications::tracking::clicked))
                        .push(
                            Router::with_path("purchased").post(notifications::tracking::purchased),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use restock_app::domain::backorders::records::BackorderUuid;
    use salvo::{
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use crate::{
        backorders::models::BackorderResponse,
        test_helpers::{Mocks, service},
    };

    use super::*;

    #[tokio::test]
    async fn test_pending_is_not_taken_for_an_order_id() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .backorders
            .expect_list_pending()
            .once()
            .return_once(|_| Ok(Vec::new()));

        let mut res = TestClient::get("http://example.com/backorders/pending")
            .send(&service(mocks, app_router()))
            .await;

        let body: Vec<BackorderResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.is_empty(), "no pending orders");

        Ok(())
    }

    #[tokio::test]
    async fn test_order_routes_reach_the_backorder_ledger() -> TestResult {
        let order = BackorderUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .backorders
            .expect_get_status()
            .once()
            .withf(move |u| *u == order)
            .return_once(|_| Ok(None));

        let res = TestClient::get(format!("http://example.com/backorders/{order}"))
            .send(&service(mocks, app_router()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
