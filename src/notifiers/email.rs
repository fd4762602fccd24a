//! SMTP channel.
//!
//! Connects with STARTTLS and authenticates when a username is configured.
//! `to_email` may list several recipients separated by commas.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::core::dispatch::{Notifier, NotifyOutcome};
use crate::core::models::Alert;
use crate::error::{GuardianError, Result};
use crate::storage::EmailConfig;

const CHANNEL: &str = "email";
const SUBJECT_PREFIX: &str = "[Rate Guardian]";

pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl EmailNotifier {
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for unparseable addresses or an SMTP relay that
    /// cannot be set up.
    pub fn new(config: &EmailConfig, timeout: Duration) -> Result<Self> {
        let from = parse_mailbox("notifications.email.from_email", &config.from_email)?;
        let to = config
            .to_email
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(|addr| parse_mailbox("notifications.email.to_email", addr))
            .collect::<Result<Vec<_>>>()?;
        if to.is_empty() {
            return Err(GuardianError::ConfigInvalid {
                key: "notifications.email.to_email".to_string(),
                message: "no recipients".to_string(),
            });
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(config.smtp_host.trim())
            .map_err(|e| GuardianError::ConfigInvalid {
                key: "notifications.email.smtp_host".to_string(),
                message: e.to_string(),
            })?
            .port(config.smtp_port)
            .timeout(Some(timeout));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    /// Build the message for `alert`.
    ///
    /// # Errors
    ///
    /// Returns `NotificationFailed` if the message cannot be assembled.
    pub fn compose(&self, alert: &Alert) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(format!("{SUBJECT_PREFIX} {}", alert.title))
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }

        let body = format!(
            "{}\n\n{}\n\nLevel: {}\nTarget: {}\nTime: {}\n",
            alert.title,
            alert.message,
            alert.severity.as_str(),
            alert.target_name,
            alert.timestamp.to_rfc3339(),
        );
        builder.body(body).map_err(|e| failed(&e))
    }

    async fn deliver(&self, alert: &Alert) -> Result<()> {
        let message = self.compose(alert)?;
        self.transport.send(message).await.map_err(|e| failed(&e))?;
        Ok(())
    }
}

fn parse_mailbox(key: &str, value: &str) -> Result<Mailbox> {
    value
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| GuardianError::ConfigInvalid {
            key: key.to_string(),
            message: format!("'{value}': {e}"),
        })
}

fn failed(err: &impl std::fmt::Display) -> GuardianError {
    GuardianError::NotificationFailed {
        channel: CHANNEL.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, alert: &Alert) -> NotifyOutcome {
        self.deliver(alert).await.into()
    }
}
