//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use restock::{
    email::{EmailAddress, EmailError},
    keys::StockKey,
    status::BackorderStatus,
};
use salvo::{affix_state::inject, prelude::*};

use restock_app::{
    context::AppContext,
    domain::{
        backorders::{
            MockBackordersService,
            records::{BackorderLineItemRecord, BackorderRecord, BackorderUuid, LineItemUuid},
        },
        catalog::MockCatalogService,
        notifications::MockNotificationsService,
        reconciliation::{MockReconciliationService, records::ReconciliationSummary},
        schedules::MockSchedulesService,
        stock::MockStockService,
        waitlist::MockWaitlistService,
    },
    uuids::UserUuid,
};

use crate::state::State;

/// One mock per service. A mock without expectations fails the test when called.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) catalog: MockCatalogService,
    pub(crate) stock: MockStockService,
    pub(crate) waitlist: MockWaitlistService,
    pub(crate) backorders: MockBackordersService,
    pub(crate) schedules: MockSchedulesService,
    pub(crate) notifications: MockNotificationsService,
    pub(crate) reconciliation: MockReconciliationService,
}

pub(crate) fn state_with(mocks: Mocks) -> Arc<State> {
    State::from_app_context(AppContext {
        catalog: Arc::new(mocks.catalog),
        stock: Arc::new(mocks.stock),
        waitlist: Arc::new(mocks.waitlist),
        backorders: Arc::new(mocks.backorders),
        schedules: Arc::new(mocks.schedules),
        notifications: Arc::new(mocks.notifications),
        reconciliation: Arc::new(mocks.reconciliation),
    })
}

pub(crate) fn service(mocks: Mocks, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(state_with(mocks))).push(route))
}

pub(crate) fn make_backorder(
    uuid: BackorderUuid,
    key: StockKey,
    quantity: u64,
) -> Result<BackorderRecord, EmailError> {
    Ok(BackorderRecord {
        uuid,
        user: UserUuid::new(),
        email: EmailAddress::parse("shopper@example.com")?,
        status: BackorderStatus::Pending,
        total_amount: 1_500 * quantity,
        currency: "GBP".to_string(),
        priority: 1,
        expected_fulfillment_date: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        items: vec![BackorderLineItemRecord {
            uuid: LineItemUuid::new(),
            order: uuid,
            position: 0,
            key,
            quantity,
            size: None,
            color: None,
            price: 1_500,
            allocated_at: None,
            stock_deducted: false,
        }],
    })
}

pub(crate) fn make_summary(
    key: StockKey,
    fulfilled: Vec<BackorderUuid>,
    remaining: u64,
) -> ReconciliationSummary {
    ReconciliationSummary {
        key,
        backorders_fulfilled: fulfilled.len(),
        notifications_sent: 0,
        remaining_quantity: remaining,
        fulfilled_order_ids: fulfilled,
    }
}
