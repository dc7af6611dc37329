use clap::{Args, Parser, Subcommand, ValueEnum};
use restock::{
    allocation::AllocationPolicy,
    keys::{ProductUuid, StockKey, VariantUuid},
};
use restock_app::{
    context::{AppContext, AppSettings, MailSettings},
    domain::notifications::{settings::NotificationSettings, transport::SmtpSettings},
};

mod notifications;
mod schedules;
mod stock;

#[derive(Debug, Parser)]
#[command(name = "restock-app", about = "Restock admin CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Stock(stock::StockCommand),
    Schedules(schedules::SchedulesCommand),
    Notifications(notifications::NotificationsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Stock(command) => stock::run(command).await,
            Commands::Schedules(command) => schedules::run(command).await,
            Commands::Notifications(command) => notifications::run(command).await,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MailTransportKind {
    Log,
    Smtp,
}

/// Connection and wiring options shared by every command.
#[derive(Debug, Args)]
pub(crate) struct ContextArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Storefront base URL used in notification links
    #[arg(long, env = "STOREFRONT_URL", default_value = "http://localhost:3000")]
    storefront_url: String,

    /// Minutes a restock reservation link stays valid
    #[arg(long, env = "RESERVATION_MINUTES", default_value_t = 30)]
    reservation_minutes: u32,

    /// Whether allocated backorder units are deducted from stock
    #[arg(long, env = "ALLOCATION_POLICY", default_value_t = AllocationPolicy::DeductStock)]
    allocation_policy: AllocationPolicy,

    /// Where outbound mail goes
    #[arg(long, env = "MAIL_TRANSPORT", value_enum, default_value_t = MailTransportKind::Log)]
    mail_transport: MailTransportKind,

    #[arg(long, env = "SMTP_HOST", default_value = "localhost")]
    smtp_host: String,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    smtp_port: u16,

    #[arg(long, env = "SMTP_USERNAME")]
    smtp_username: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    smtp_password: Option<String>,

    /// `From` header for outbound mail
    #[arg(long, env = "MAIL_SENDER", default_value = "Restock <noreply@localhost>")]
    mail_sender: String,
}

impl ContextArgs {
    pub(crate) async fn connect(self) -> Result<AppContext, String> {
        let mail = match self.mail_transport {
            MailTransportKind::Log => MailSettings::Log,
            MailTransportKind::Smtp => MailSettings::Smtp(SmtpSettings {
                host: self.smtp_host,
                port: self.smtp_port,
                username: self.smtp_username,
                password: self.smtp_password,
                sender: self.mail_sender,
            }),
        };

        let settings = AppSettings {
            notifications: NotificationSettings::new(self.storefront_url, self.reservation_minutes),
            mail,
            allocation_policy: self.allocation_policy,
            migrate: false,
        };

        AppContext::from_database_url(&self.database_url, settings)
            .await
            .map_err(|error| format!("failed to initialise: {error}"))
    }
}

/// Product and optional variant identifying a stock key.
#[derive(Debug, Args)]
pub(crate) struct KeyArgs {
    /// Product UUID
    #[arg(long)]
    product: ProductUuid,

    /// Variant UUID; the bare product when omitted
    #[arg(long)]
    variant: Option<VariantUuid>,
}

impl KeyArgs {
    pub(crate) fn key(&self) -> StockKey {
        StockKey::from_parts(self.product, self.variant)
    }
}
