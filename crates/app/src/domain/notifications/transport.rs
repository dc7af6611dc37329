//! Mail Transports

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    address::AddressError,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use restock::email::EmailAddress;
use thiserror::Error;
use tracing::info;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub recipient: EmailAddress,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum MailTransportError {
    #[error("invalid mail address")]
    Address(#[from] AddressError),

    #[error("failed to build message")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Delivers one message.
    async fn send(&self, email: OutboundEmail) -> Result<(), MailTransportError>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailTransportError> {
        info!(
            recipient = %email.recipient,
            subject = %email.subject,
            body = %email.text,
            "outbound email"
        );

        Ok(())
    }
}

/// SMTP relay connection details.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,

    /// `From` header, e.g. `Shop <noreply@example.com>`.
    pub sender: String,
}

/// Delivers messages through an SMTP relay as multipart plain text and HTML.
#[derive(Clone)]
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailTransport {
    /// Build a transport for the relay in `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sender address is invalid or the relay cannot be configured.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailTransportError> {
        let sender: Mailbox = settings.sender.parse()?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?.port(settings.port);

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            sender,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    #[tracing::instrument(
        name = "notifications.transport.smtp.send",
        skip(self, email),
        fields(recipient = %email.recipient),
        err
    )]
    async fn send(&self, email: OutboundEmail) -> Result<(), MailTransportError> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(email.recipient.as_str().parse()?)
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))?;

        self.mailer.send(message).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn log_transport_accepts_every_message() -> TestResult {
        let email = OutboundEmail {
            recipient: EmailAddress::parse("ada@example.com")?,
            subject: "Back in stock".to_string(),
            html: "<p>Back in stock</p>".to_string(),
            text: "Back in stock".to_string(),
        };

        LogMailTransport.send(email).await?;

        Ok(())
    }

    #[test]
    fn smtp_transport_rejects_invalid_sender() {
        let result = SmtpMailTransport::new(&SmtpSettings {
            host: "localhost".to_string(),
            port: 2525,
            username: None,
            password: None,
            sender: "not a mailbox".to_string(),
        });

        assert!(
            matches!(result, Err(MailTransportError::Address(_))),
            "expected Address error"
        );
    }
}
