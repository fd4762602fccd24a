//! Generic HTTP webhook channel.
//!
//! `POST` sends the alert as a JSON body; `GET` sends the same fields as a
//! query string. Custom headers are attached to every request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::Serialize;

use crate::core::dispatch::{Notifier, NotifyOutcome};
use crate::core::http::{self, build_client};
use crate::core::models::Alert;
use crate::error::{GuardianError, Result};
use crate::notifiers::{delivery_error, expect_success};
use crate::storage::WebhookConfig;

const CHANNEL: &str = "webhook";

/// Fields sent to the webhook.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub level: &'a str,
    pub target: &'a str,
    pub usage_percent: f64,
    pub threshold_percent: f64,
    pub kind: &'a str,
    /// Unix seconds.
    pub timestamp: i64,
}

impl<'a> From<&'a Alert> for WebhookPayload<'a> {
    fn from(alert: &'a Alert) -> Self {
        Self {
            title: &alert.title,
            message: &alert.message,
            level: alert.severity.as_str(),
            target: &alert.target_name,
            usage_percent: alert.usage_percent,
            threshold_percent: alert.threshold_percent,
            kind: alert.kind.as_str(),
            timestamp: alert.timestamp.timestamp(),
        }
    }
}

pub struct WebhookNotifier {
    client: Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    timeout: Duration,
}

impl WebhookNotifier {
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for an unsupported method or a header that is
    /// not valid HTTP.
    pub fn new(config: &WebhookConfig, timeout: Duration) -> Result<Self> {
        let method = match config.method.trim().to_uppercase().as_str() {
            "POST" => Method::POST,
            "GET" => Method::GET,
            other => {
                return Err(GuardianError::ConfigInvalid {
                    key: "notifications.webhook.method".to_string(),
                    message: format!("'{other}' is not GET or POST"),
                });
            }
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let key = format!("notifications.webhook.headers.{name}");
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                GuardianError::ConfigInvalid {
                    key: key.clone(),
                    message: e.to_string(),
                }
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                GuardianError::ConfigInvalid {
                    key,
                    message: e.to_string(),
                }
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(Self {
            client: build_client(timeout)?,
            url: config.url.trim().to_string(),
            method,
            headers,
            timeout,
        })
    }

    async fn deliver(&self, alert: &Alert) -> Result<()> {
        let payload = WebhookPayload::from(alert);
        let request = self
            .client
            .request(self.method.clone(), &self.url)
            .headers(self.headers.clone());
        let request = if self.method == Method::GET {
            request.query(&payload)
        } else {
            request.json(&payload)
        };

        let response = http::send(request, self.timeout)
            .await
            .map_err(|e| delivery_error(CHANNEL, &e))?;
        expect_success(CHANNEL, response).await
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, alert: &Alert) -> NotifyOutcome {
        self.deliver(alert).await.into()
    }
}
