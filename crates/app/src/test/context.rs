//! Test context for service-level integration tests.

use std::sync::Arc;

use restock::allocation::AllocationPolicy;

use crate::{
    database::Db,
    domain::{
        backorders::PgBackordersService,
        catalog::PgCatalogService,
        notifications::{
            PgNotificationsService, settings::NotificationSettings, transport::MailTransport,
        },
        reconciliation::InventoryCoordinator,
        schedules::PgSchedulesService,
        stock::PgStockService,
        waitlist::PgWaitlistService,
    },
};

use super::{db::TestDb, transport::RecordingTransport};

pub struct TestContext {
    pub db: TestDb,
    pub catalog: PgCatalogService,
    pub stock: PgStockService,
    pub waitlist: PgWaitlistService,
    pub backorders: PgBackordersService,
    pub schedules: PgSchedulesService,
    pub notifications: PgNotificationsService,

    /// Everything the services above have sent.
    pub mail: Arc<RecordingTransport>,

    /// Coordinator wired to the services above, deducting stock on allocation.
    pub coordinator: InventoryCoordinator,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());
        let mail = Arc::new(RecordingTransport::default());

        let catalog = PgCatalogService::new(db.clone());
        let stock = PgStockService::new(db.clone());
        let waitlist = PgWaitlistService::new(db.clone());
        let backorders = PgBackordersService::new(db.clone());
        let schedules = PgSchedulesService::new(db.clone());
        let notifications = PgNotificationsService::new(
            db,
            mail.clone(),
            NotificationSettings::new("https://shop.example.com", 30),
        );

        let coordinator = InventoryCoordinator::new(
            Arc::new(stock.clone()),
            Arc::new(waitlist.clone()),
            Arc::new(backorders.clone()),
            Arc::new(schedules.clone()),
            Arc::new(notifications.clone()),
            AllocationPolicy::DeductStock,
        );

        Self {
            db: test_db,
            catalog,
            stock,
            waitlist,
            backorders,
            schedules,
            notifications,
            mail,
            coordinator,
        }
    }

    /// A coordinator over this context's services allocating under `policy`.
    pub fn coordinator_with(&self, policy: AllocationPolicy) -> InventoryCoordinator {
        InventoryCoordinator::new(
            Arc::new(self.stock.clone()),
            Arc::new(self.waitlist.clone()),
            Arc::new(self.backorders.clone()),
            Arc::new(self.schedules.clone()),
            Arc::new(self.notifications.clone()),
            policy,
        )
    }

    /// A notifications service sharing this context's database but sending through `transport`.
    pub fn notifications_with(&self, transport: Arc<dyn MailTransport>) -> PgNotificationsService {
        PgNotificationsService::new(
            Db::new(self.db.pool().clone()),
            transport,
            NotificationSettings::new("https://shop.example.com", 30),
        )
    }
}
