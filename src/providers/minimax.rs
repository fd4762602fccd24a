//! MiniMax quota probe.
//!
//! MiniMax exposes an Anthropic-compatible messages endpoint but
//! authenticates with a bearer token and reports generic `X-RateLimit-*`
//! headers.

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
use crate::providers::probe::{self, GENERIC_HEADERS};

pub struct MiniMaxChecker {
    client: Client,
    base_url: String,
    credential: Credential,
    timeout: Duration,
}

impl MiniMaxChecker {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(spec: &CheckerSpec) -> Result<Self> {
        Ok(Self {
            client: build_client(spec.timeout)?,
            base_url: spec.base_url_or(Provider::MiniMax.default_base_url()),
            credential: spec.credential.clone(),
            timeout: spec.timeout,
        })
    }

    async fn fetch(&self) -> Result<UsageReport> {
        let request = self
            .client
            .post(format!("{}/anthropic/v1/messages", self.base_url))
            .bearer_auth(self.credential.expose())
            .json(&json!({
                "model": "MiniMax-M2.1",
                "messages": [{ "role": "user", "content": "hi" }],
                "max_tokens": 1,
            }));

        probe::probe_headers(
            Provider::MiniMax.cli_name(),
            request,
            self.timeout,
            &[GENERIC_HEADERS],
        )
        .await
    }
}

#[async_trait]
impl Checker for MiniMaxChecker {
    fn provider(&self) -> &str {
        Provider::MiniMax.cli_name()
    }

    async fn check(&self) -> UsageReport {
        probe::into_report(self.provider(), self.fetch().await)
    }
}
