//! OpenAI quota probe.
//!
//! Sends a one-word embeddings request, the cheapest authenticated call,
//! and reads the per-minute request counters from the response headers.

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
use crate::providers::probe::{self, GENERIC_HEADERS, REQUEST_HEADERS};

const PROBE_MODEL: &str = "text-embedding-3-small";

pub struct OpenAiChecker {
    client: Client,
    base_url: String,
    credential: Credential,
    organization: Option<String>,
    timeout: Duration,
}

impl OpenAiChecker {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(spec: &CheckerSpec) -> Result<Self> {
        Ok(Self {
            client: build_client(spec.timeout)?,
            base_url: spec.base_url_or(Provider::OpenAI.default_base_url()),
            credential: spec.credential.clone(),
            organization: spec.organization.clone(),
            timeout: spec.timeout,
        })
    }

    async fn fetch(&self) -> Result<UsageReport> {
        let mut request = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .bearer_auth(self.credential.expose())
            .json(&json!({ "model": PROBE_MODEL, "input": "ping" }));
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        probe::probe_headers(
            Provider::OpenAI.cli_name(),
            request,
            self.timeout,
            &[REQUEST_HEADERS, GENERIC_HEADERS],
        )
        .await
    }
}

#[async_trait]
impl Checker for OpenAiChecker {
    fn provider(&self) -> &str {
        Provider::OpenAI.cli_name()
    }

    async fn check(&self) -> UsageReport {
        probe::into_report(self.provider(), self.fetch().await)
    }
}
