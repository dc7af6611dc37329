//! Notification Tracking Handlers
//!
//! Funnel events reported by the storefront and email pixel. Every event is idempotent and
//! implies the earlier ones.

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use restock_app::domain::notifications::{
    NotificationsServiceError,
    records::{Engagement, NotificationUuid, RestockNotificationRecord},
};

use crate::{extensions::*, notifications::errors::into_status_error};

/// Tracking Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TrackingResponse {
    pub success: bool,
    pub message: String,
    pub notification: NotificationResponse,
}

/// Restock Notification Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct NotificationResponse {
    pub uuid: Uuid,
    pub subscription: Uuid,
    pub sent_at: String,
    pub email_opened: bool,
    pub link_clicked: bool,
    pub purchase_completed: bool,
}

impl From<RestockNotificationRecord> for NotificationResponse {
    fn from(record: RestockNotificationRecord) -> Self {
        Self {
            uuid: record.uuid.into_uuid(),
            subscription: record.subscription.into_uuid(),
            sent_at: record.sent_at.to_string(),
            email_opened: record.email_opened,
            link_clicked: record.link_clicked,
            purchase_completed: record.purchase_completed,
        }
    }
}

async fn track(
    depot: &Depot,
    notification: Uuid,
    engagement: Engagement,
) -> Result<Json<TrackingResponse>, StatusError> {
    let app = depot.app_or_500()?;
    let notification = NotificationUuid::from_uuid(notification);

    let result: Result<RestockNotificationRecord, NotificationsServiceError> = match engagement {
        Engagement::Opened => app.notifications.track_open(notification).await,
        Engagement::Clicked => app.notifications.track_click(notification).await,
        Engagement::Purchased => app.notifications.track_purchase(notification).await,
    };

    let message = match engagement {
        Engagement::Opened => "Open recorded",
        Engagement::Clicked => "Click recorded",
        Engagement::Purchased => "Purchase recorded",
    };

    Ok(Json(TrackingResponse {
        success: true,
        message: message.to_string(),
        notification: result.map_err(into_status_error)?.into(),
    }))
}

/// Track Open Handler
#[endpoint(
    tags("notifications"),
    summary = "Track Open",
    responses(
        (status_code = StatusCode::OK, description = "Open recorded"),
        (status_code = StatusCode::NOT_FOUND, description = "Notification not found"),
    ),
)]
pub(crate) async fn opened(
    notification: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<TrackingResponse>, StatusError> {
    track(depot, notification.into_inner(), Engagement::Opened).await
}

/// Track Click Handler
#[endpoint(
    tags("notifications"),
    summary = "Track Click",
    responses(
        (status_code = StatusCode::OK, description = "Click recorded"),
        (status_code = StatusCode::NOT_FOUND, description = "Notification not found"),
    ),
)]
pub(crate) async fn clicked(
    notification: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<TrackingResponse>, StatusError> {
    track(depot, notification.into_inner(), Engagement::Clicked).await
}

/// Track Purchase Handler
#[endpoint(
    tags("notifications"),
    summary = "Track Purchase",
    responses(
        (status_code = StatusCode::OK, description = "Purchase recorded"),
        (status_code = StatusCode::NOT_FOUND, description = "Notification not found"),
    ),
)]
pub(crate) async fn purchased(
    notification: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<TrackingResponse>, StatusError> {
    track(depot, notification.into_inner(), Engagement::Purchased).await
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use restock_app::domain::waitlist::records::SubscriptionUuid;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(
            mocks,
            Router::with_path("notifications/{notification}")
                .push(Router::with_path("opened").post(opened))
                .push(Router::with_path("clicked").post(clicked))
                .push(Router::with_path("purchased").post(purchased)),
        )
    }

    fn make_record(uuid: NotificationUuid) -> RestockNotificationRecord {
        RestockNotificationRecord {
            uuid,
            subscription: SubscriptionUuid::new(),
            sent_at: Timestamp::UNIX_EPOCH,
            email_opened: true,
            link_clicked: true,
            purchase_completed: true,
            reservation_token: "token".to_string(),
            reservation_expires_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn test_purchase_marks_the_whole_funnel() -> TestResult {
        let uuid = NotificationUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .notifications
            .expect_track_purchase()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(move |u| Ok(make_record(u)));

        let mut res = TestClient::post(format!("http://example.com/notifications/{uuid}/purchased"))
            .send(&make_service(mocks))
            .await;

        let body: TrackingResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.notification.uuid, uuid.into_uuid());
        assert!(body.notification.email_opened, "purchase implies open");
        assert!(body.notification.link_clicked, "purchase implies click");

        Ok(())
    }

    #[tokio::test]
    async fn test_open_routes_to_track_open() -> TestResult {
        let uuid = NotificationUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .notifications
            .expect_track_open()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(move |u| Ok(make_record(u)));

        let res = TestClient::post(format!("http://example.com/notifications/{uuid}/opened"))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_click_unknown_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .notifications
            .expect_track_click()
            .once()
            .return_once(|_| Err(NotificationsServiceError::NotFound));

        let res = TestClient::post(format!(
            "http://example.com/notifications/{}/clicked",
            NotificationUuid::new()
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
