//! Notifications Config

use clap::{Args, ValueEnum};
use restock::allocation::AllocationPolicy;
use restock_app::{
    context::MailSettings,
    domain::notifications::{settings::NotificationSettings, transport::SmtpSettings},
};

/// Outbound mail transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MailTransportKind {
    /// Write messages to the log.
    Log,

    /// Deliver over SMTP.
    Smtp,
}

/// Notification, mail and allocation settings.
#[derive(Debug, Args)]
pub struct NotificationsConfig {
    /// Storefront base URL used in notification links
    #[arg(long, env = "STOREFRONT_URL", default_value = "http://localhost:3000")]
    pub storefront_url: String,

    /// Minutes a restock reservation link stays valid
    #[arg(long, env = "RESERVATION_MINUTES", default_value_t = 30)]
    pub reservation_minutes: u32,

    /// Whether allocated backorder units are deducted from stock (deduct-stock, ledger-only)
    #[arg(long, env = "ALLOCATION_POLICY", default_value_t = AllocationPolicy::DeductStock)]
    pub allocation_policy: AllocationPolicy,

    /// Mail transport (log, smtp)
    #[arg(long, env = "MAIL_TRANSPORT", value_enum, default_value_t = MailTransportKind::Log)]
    pub mail_transport: MailTransportKind,

    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST", default_value = "localhost")]
    pub smtp_host: String,

    /// SMTP relay port
    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// SMTP username
    #[arg(long, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// `From` header for outbound mail
    #[arg(long, env = "MAIL_SENDER", default_value = "Restock <noreply@localhost>")]
    pub mail_sender: String,
}

impl NotificationsConfig {
    pub(crate) fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings::new(self.storefront_url.clone(), self.reservation_minutes)
    }

    pub(crate) fn mail_settings(&self) -> MailSettings {
        match self.mail_transport {
            MailTransportKind::Log => MailSettings::Log,
            MailTransportKind::Smtp => MailSettings::Smtp(SmtpSettings {
                host: self.smtp_host.clone(),
                port: self.smtp_port,
                username: self.smtp_username.clone(),
                password: self.smtp_password.clone(),
                sender: self.mail_sender.clone(),
            }),
        }
    }
}
