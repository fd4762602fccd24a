//! GitHub quota probe.
//!
//! `GET /rate_limit` does not count against the quota and returns the core
//! REST counters as JSON.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;

use crate::core::checker::{Checker, CheckerSpec};
use crate::core::credential::Credential;
use crate::core::http::{self, build_client};
use crate::core::models::UsageReport;
use crate::core::provider::Provider;
use crate::error::{GuardianError, Result};
use crate::providers::probe;

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: Resources,
}

#[derive(Debug, Deserialize)]
struct Resources {
    core: CoreLimit,
}

#[derive(Debug, Deserialize)]
struct CoreLimit {
    limit: f64,
    remaining: f64,
    /// Unix seconds.
    reset: Option<i64>,
}

pub struct GitHubChecker {
    client: Client,
    base_url: String,
    credential: Credential,
    timeout: Duration,
}

impl GitHubChecker {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(spec: &CheckerSpec) -> Result<Self> {
        Ok(Self {
            client: build_client(spec.timeout)?,
            base_url: spec.base_url_or(Provider::GitHub.default_base_url()),
            credential: spec.credential.clone(),
            timeout: spec.timeout,
        })
    }

    async fn fetch(&self) -> Result<UsageReport> {
        let provider = Provider::GitHub.cli_name();
        let request = self
            .client
            .get(format!("{}/rate_limit", self.base_url))
            .header(AUTHORIZATION, format!("token {}", self.credential.expose()))
            .header(ACCEPT, "application/vnd.github+json");

        let response = http::send(request, self.timeout).await?;
        let response = probe::ensure_success(provider, response).await?;
        let body: RateLimitResponse = response
            .json()
            .await
            .map_err(|e| GuardianError::ParseResponse(e.to_string()))?;

        let core = body.resources.core;
        let reset = core
            .reset
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|at| at.to_rfc3339());
        Ok(UsageReport::from_counts(provider, core.limit, core.remaining, reset))
    }
}

#[async_trait]
impl Checker for GitHubChecker {
    fn provider(&self) -> &str {
        Provider::GitHub.cli_name()
    }

    async fn check(&self) -> UsageReport {
        probe::into_report(self.provider(), self.fetch().await)
    }
}
