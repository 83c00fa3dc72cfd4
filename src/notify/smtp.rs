use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use super::{render_report_email, NotificationError, Notifier, SendReceipt};
use crate::config::{SmtpConfig, APP_NAME};
use crate::models::ClassifiedTest;

/// Port served with implicit TLS; any other port upgrades with STARTTLS.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Authenticated SMTP sender.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let from = sender_mailbox(&config.user)?;

        let builder = if uses_implicit_tls(config.port) {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        };
        let transport = builder
            .map_err(|e| NotificationError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.expose().to_string(),
            ))
            .build();

        tracing::info!(
            host = %config.host,
            port = config.port,
            implicit_tls = uses_implicit_tls(config.port),
            "SMTP transport configured"
        );
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_report(
        &self,
        to: &str,
        out_of_range: &[ClassifiedTest],
        in_range: &[ClassifiedTest],
    ) -> Result<SendReceipt, NotificationError> {
        let email = render_report_email(out_of_range, in_range);
        let message_id = new_message_id();

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient_mailbox(to)?)
            .subject(email.subject)
            .message_id(Some(message_id.clone()))
            .multipart(MultiPart::alternative_plain_html(email.plain, email.html))
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        Ok(SendReceipt { message_id })
    }
}

fn uses_implicit_tls(port: u16) -> bool {
    port == IMPLICIT_TLS_PORT
}

fn sender_mailbox(user: &str) -> Result<Mailbox, NotificationError> {
    let address = parse_address(user)?;
    Ok(Mailbox::new(Some(APP_NAME.to_string()), address))
}

fn recipient_mailbox(to: &str) -> Result<Mailbox, NotificationError> {
    Ok(Mailbox::new(None, parse_address(to)?))
}

fn parse_address(raw: &str) -> Result<Address, NotificationError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| NotificationError::InvalidAddress {
            address: raw.to_string(),
            reason: e.to_string(),
        })
}

fn new_message_id() -> String {
    format!("<{}@diagnexus>", Uuid::new_v4())
}
