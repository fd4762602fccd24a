//! Anthropic quota probe: a one-token messages request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::core::checker::{Checker, CheckerSpec};
use crate::core::credential::Credential;
use crate::core::http::build_client;
use crate::core::models::UsageReport;
use crate::core::provider::Provider;
use crate::error::Result;
use crate::providers::probe::{self, ANTHROPIC_HEADERS};

const API_VERSION: &str = "2023-06-01";
const PROBE_MODEL: &str = "claude-3-5-haiku-latest";

pub struct AnthropicChecker {
    client: Client,
    base_url: String,
    credential: Credential,
    timeout: Duration,
}

impl AnthropicChecker {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(spec: &CheckerSpec) -> Result<Self> {
        Ok(Self {
            client: build_client(spec.timeout)?,
            base_url: spec.base_url_or(Provider::Anthropic.default_base_url()),
            credential: spec.credential.clone(),
            timeout: spec.timeout,
        })
    }

    async fn fetch(&self) -> Result<UsageReport> {
        let request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", API_VERSION)
            .json(&json!({
                "model": PROBE_MODEL,
                "max_tokens": 1,
                "messages": [{ "role": "user", "content": "hi" }],
            }));

        probe::probe_headers(
            Provider::Anthropic.cli_name(),
            request,
            self.timeout,
            &[ANTHROPIC_HEADERS],
        )
        .await
    }
}

#[async_trait]
impl Checker for AnthropicChecker {
    fn provider(&self) -> &str {
        Provider::Anthropic.cli_name()
    }

    async fn check(&self) -> UsageReport {
        probe::into_report(self.provider(), self.fetch().await)
    }
}
