use std::time::Duration;

use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use monitor_logging::{monitor_debug, monitor_info};
use thiserror::Error;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// What happened to a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Credentials or target missing; nothing was sent.
    Skipped,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("smtp session timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<Delivery, NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Email-to-SMS gateway address of the recipient.
    pub target: Option<String>,
    /// Upper bound for a whole session, connect to quit.
    pub timeout: Duration,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            target: None,
            timeout: Duration::from_secs(30),
        }
    }
}

struct Transport<'a> {
    username: &'a str,
    password: &'a str,
    target: &'a str,
}

/// Sends each notification in its own STARTTLS session.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    settings: SmtpSettings,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    /// True when username, password and target are all present.
    pub fn is_configured(&self) -> bool {
        self.transport().is_some()
    }

    fn transport(&self) -> Option<Transport<'_>> {
        Some(Transport {
            username: non_empty(&self.settings.username)?,
            password: non_empty(&self.settings.password)?,
            target: non_empty(&self.settings.target)?,
        })
    }

    async fn send(&self, transport: &Transport<'_>, email: Message) -> Result<(), NotifyError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)?
            .port(self.settings.port)
            .credentials(Credentials::new(
                transport.username.to_string(),
                transport.password.to_string(),
            ))
            .timeout(Some(self.settings.timeout))
            .build();

        monitor_debug!(
            "Opening SMTP session to {}:{}",
            self.settings.host,
            self.settings.port
        );
        tokio::time::timeout(self.settings.timeout, mailer.send(email))
            .await
            .map_err(|_| NotifyError::Timeout(self.settings.timeout))??;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<Delivery, NotifyError> {
        let Some(transport) = self.transport() else {
            monitor_info!("SMTP_USER, SMTP_PASS or SMS_TARGET not set; skipping notification.");
            return Ok(Delivery::Skipped);
        };

        let email = build_email(transport.username, transport.target, subject, body)?;
        self.send(&transport, email).await?;
        monitor_info!("Sent SMS via {}", transport.target);
        Ok(Delivery::Sent)
    }
}

/// Plain-text message from the SMTP account to the gateway address.
pub fn build_email(
    from: &str,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<Message, NotifyError> {
    let email = Message::builder()
        .from(parse_mailbox(from)?)
        .to(parse_mailbox(to)?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?;
    Ok(email)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse::<Mailbox>().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}
