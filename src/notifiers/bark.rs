//! Bark (iOS push) channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::core::dispatch::{Notifier, NotifyOutcome};
use crate::core::http::{self, build_client};
use crate::core::models::{Alert, Severity};
use crate::error::Result;
use crate::notifiers::{delivery_error, expect_success};
use crate::storage::BarkConfig;

const CHANNEL: &str = "bark";

pub struct BarkNotifier {
    client: Client,
    endpoint: String,
    key: String,
    timeout: Duration,
}

impl BarkNotifier {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &BarkConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: push_endpoint(&config.server),
            key: config.key.trim().to_string(),
            timeout,
        })
    }

    async fn deliver(&self, alert: &Alert) -> Result<()> {
        let request = self.client.post(&self.endpoint).json(&json!({
            "title": alert.title,
            "body": alert.message,
            "key": self.key,
            "level": interruption_level(alert.severity),
        }));
        let response = http::send(request, self.timeout)
            .await
            .map_err(|e| delivery_error(CHANNEL, &e))?;
        expect_success(CHANNEL, response).await
    }
}

/// `server` may be a bare host or a base URL with scheme.
fn push_endpoint(server: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        format!("{server}/push")
    } else {
        format!("https://{server}/push")
    }
}

/// Bark interruption level for a severity.
const fn interruption_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "timeSensitive",
        Severity::Warning => "active",
        Severity::Info => "passive",
    }
}

#[async_trait]
impl Notifier for BarkNotifier {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, alert: &Alert) -> NotifyOutcome {
        self.deliver(alert).await.into()
    }
}
