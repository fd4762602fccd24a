//! Built-in notification channels.
//!
//! Channels are built once from the expanded `[notifications]` config and
//! handed to the monitor as a [`NotifierSet`].

pub mod bark;
pub mod console;
pub mod email;
pub mod telegram;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Response;

use crate::core::dispatch::NotifierSet;
use crate::core::http;
use crate::error::{GuardianError, Result};
use crate::storage::NotificationsConfig;

pub use bark::BarkNotifier;
pub use console::ConsoleNotifier;
pub use email::EmailNotifier;
pub use telegram::TelegramNotifier;
pub use webhook::WebhookNotifier;

const ERROR_BODY_LIMIT: usize = 200;

/// Build every enabled channel.
///
/// # Errors
///
/// Returns a configuration error if a channel's settings cannot be turned
/// into a working client (bad email address, bad header name, ...).
pub fn build_notifiers(config: &NotificationsConfig, timeout: Duration) -> Result<NotifierSet> {
    let mut set = NotifierSet::default();

    if let Some(c) = config.telegram.as_ref().filter(|c| c.enabled) {
        set.push(Arc::new(TelegramNotifier::new(c, timeout)?));
    }
    if let Some(c) = config.email.as_ref().filter(|c| c.enabled) {
        set.push(Arc::new(EmailNotifier::new(c, timeout)?));
    }
    if let Some(c) = config.webhook.as_ref().filter(|c| c.enabled) {
        set.push(Arc::new(WebhookNotifier::new(c, timeout)?));
    }
    if let Some(c) = config.bark.as_ref().filter(|c| c.enabled) {
        set.push(Arc::new(BarkNotifier::new(c, timeout)?));
    }
    if config.console.as_ref().is_some_and(|c| c.enabled) {
        set.push(Arc::new(ConsoleNotifier::new()));
    }

    if set.is_empty() {
        tracing::warn!("no notification channels enabled; alerts will only be logged");
    }
    Ok(set)
}

/// Map a non-2xx response to `NotificationFailed`.
pub(crate) async fn expect_success(channel: &str, response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = http::body_snippet(response, ERROR_BODY_LIMIT).await;
    Err(GuardianError::NotificationFailed {
        channel: channel.to_string(),
        reason: if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        },
    })
}

/// Wrap a transport error for `channel`.
pub(crate) fn delivery_error(channel: &str, err: &GuardianError) -> GuardianError {
    GuardianError::NotificationFailed {
        channel: channel.to_string(),
        reason: err.to_string(),
    }
}
