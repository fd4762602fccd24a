//! Telegram Bot API channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::core::dispatch::{Notifier, NotifyOutcome};
use crate::core::http::{self, build_client};
use crate::core::models::Alert;
use crate::error::Result;
use crate::notifiers::{delivery_error, expect_success};
use crate::storage::TelegramConfig;

const CHANNEL: &str = "telegram";
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramNotifier {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self> {
        let base = config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: format!("{base}/bot{}/sendMessage", config.token.trim()),
            chat_id: config.chat_id.trim().to_string(),
            timeout,
        })
    }

    /// Markdown message body.
    #[must_use]
    pub fn render(alert: &Alert) -> String {
        format!("{} *{}*\n\n{}", alert.severity.icon(), alert.title, alert.message)
    }

    async fn deliver(&self, alert: &Alert) -> Result<()> {
        let request = self.client.post(&self.endpoint).json(&json!({
            "chat_id": self.chat_id,
            "text": Self::render(alert),
            "parse_mode": "Markdown",
        }));
        let response = http::send(request, self.timeout)
            .await
            .map_err(|e| delivery_error(CHANNEL, &e))?;
        expect_success(CHANNEL, response).await
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, alert: &Alert) -> NotifyOutcome {
        self.deliver(alert).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_embeds_token() {
        let config = TelegramConfig {
            enabled: true,
            token: "123:abc".to_string(),
            chat_id: "42".to_string(),
            api_base: Some("http://127.0.0.1:9999/".to_string()),
        };
        let notifier = TelegramNotifier::new(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(notifier.endpoint, "http://127.0.0.1:9999/bot123:abc/sendMessage");
    }

    #[test]
    fn render_uses_bold_title() {
        let text = TelegramNotifier::render(&Alert::test_alert());
        assert!(text.starts_with("⚠️ *Test notification*"));
    }
}
