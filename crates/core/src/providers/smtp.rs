use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::info;

use crate::errors::CoreError;
use crate::models::settings::{MailSettings, ResolvedMailSettings};
use super::traits::ReportDelivery;

/// Submission port that upgrades a plain connection with STARTTLS.
/// Every other port gets implicit TLS (465 by default).
const STARTTLS_PORT: u16 = 587;

/// Sends the report as an HTML email over SMTP.
///
/// Settings are only checked when a report is actually sent, so a machine
/// without mail credentials can still compute and render reports.
pub struct SmtpMailer {
    settings: MailSettings,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(settings: MailSettings) -> Self {
        Self {
            settings,
            timeout: Duration::from_secs(30),
        }
    }

    /// Assemble the MIME message (single HTML part).
    pub fn build_message(
        settings: &ResolvedMailSettings,
        subject: &str,
        html_body: &str,
    ) -> Result<Message, CoreError> {
        let from: Mailbox = settings.from_address.parse()?;
        let to: Mailbox = settings.to_address.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;
        Ok(message)
    }

    fn transport(
        &self,
        settings: &ResolvedMailSettings,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, CoreError> {
        let builder = if settings.smtp_port == STARTTLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?
        };

        Ok(builder
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.credentials.username.clone(),
                settings.credentials.password.clone(),
            ))
            .timeout(Some(self.timeout))
            .build())
    }
}

#[async_trait]
impl ReportDelivery for SmtpMailer {
    fn name(&self) -> &str {
        "SMTP"
    }

    async fn send(&self, subject: &str, html_body: &str) -> Result<(), CoreError> {
        let settings = self.settings.require()?;
        let message = Self::build_message(&settings, subject, html_body)?;
        let transport = self.transport(&settings)?;

        transport.send(message).await?;
        info!(to = %settings.to_address, "Email sent successfully");
        Ok(())
    }
}
