//! App Context

use std::sync::Arc;

use restock::allocation::AllocationPolicy;
use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        backorders::{BackordersService, PgBackordersService},
        catalog::{CatalogService, PgCatalogService},
        notifications::{
            NotificationsService, PgNotificationsService,
            settings::NotificationSettings,
            transport::{
                LogMailTransport, MailTransport, MailTransportError, SmtpMailTransport,
                SmtpSettings,
            },
        },
        reconciliation::{InventoryCoordinator, ReconciliationService},
        schedules::{PgSchedulesService, SchedulesService},
        stock::{PgStockService, StockService},
        waitlist::{PgWaitlistService, WaitlistService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),

    #[error("failed to configure mail transport")]
    Mail(#[source] MailTransportError),
}

/// Where outbound mail goes.
#[derive(Debug, Clone, Default)]
pub enum MailSettings {
    /// Write messages to the log instead of sending them.
    #[default]
    Log,
    Smtp(SmtpSettings),
}

/// Everything besides the database needed to wire the services.
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    pub notifications: NotificationSettings,
    pub mail: MailSettings,
    pub allocation_policy: AllocationPolicy,

    /// Apply pending migrations before serving.
    pub migrate: bool,
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub stock: Arc<dyn StockService>,
    pub waitlist: Arc<dyn WaitlistService>,
    pub backorders: Arc<dyn BackordersService>,
    pub schedules: Arc<dyn SchedulesService>,
    pub notifications: Arc<dyn NotificationsService>,
    pub reconciliation: Arc<dyn ReconciliationService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails, migrations cannot be
    /// applied or the mail transport cannot be configured.
    pub async fn from_database_url(url: &str, settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if settings.migrate {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;
        }

        let transport: Arc<dyn MailTransport> = match &settings.mail {
            MailSettings::Log => Arc::new(LogMailTransport),
            MailSettings::Smtp(smtp) => {
                Arc::new(SmtpMailTransport::new(smtp).map_err(AppInitError::Mail)?)
            }
        };

        Ok(Self::new(Db::new(pool), transport, settings))
    }

    /// Wire every service over `db`.
    #[must_use]
    pub fn new(db: Db, transport: Arc<dyn MailTransport>, settings: AppSettings) -> Self {
        let stock: Arc<dyn StockService> = Arc::new(PgStockService::new(db.clone()));
        let waitlist: Arc<dyn WaitlistService> = Arc::new(PgWaitlistService::new(db.clone()));
        let backorders: Arc<dyn BackordersService> =
            Arc::new(PgBackordersService::new(db.clone()));
        let schedules: Arc<dyn SchedulesService> = Arc::new(PgSchedulesService::new(db.clone()));
        let notifications: Arc<dyn NotificationsService> = Arc::new(PgNotificationsService::new(
            db.clone(),
            transport,
            settings.notifications,
        ));

        let reconciliation = Arc::new(InventoryCoordinator::new(
            stock.clone(),
            waitlist.clone(),
            backorders.clone(),
            schedules.clone(),
            notifications.clone(),
            settings.allocation_policy,
        ));

        Self {
            catalog: Arc::new(PgCatalogService::new(db)),
            stock,
            waitlist,
            backorders,
            schedules,
            notifications,
            reconciliation,
        }
    }
}
