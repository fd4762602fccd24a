//! Shared plumbing for header-based quota probes.
//!
//! Most providers report quota in response headers on any authenticated
//! request. A probe sends one minimal request, checks the status, and reads
//! the first header family that is fully present.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, Response, StatusCode};

use crate::core::http;
use crate::core::models::UsageReport;
use crate::error::{GuardianError, Result};

/// Longest response body quoted in an error.
const ERROR_BODY_LIMIT: usize = 200;

/// Names of one limit/remaining/reset header triple.
#[derive(Debug, Clone, Copy)]
pub struct HeaderFamily {
    pub limit: &'static str,
    pub remaining: &'static str,
    pub reset: &'static str,
}

/// OpenAI-style per-minute request counters.
pub const REQUEST_HEADERS: HeaderFamily = HeaderFamily {
    limit: "x-ratelimit-limit-requests",
    remaining: "x-ratelimit-remaining-requests",
    reset: "x-ratelimit-reset-requests",
};

/// Generic `X-RateLimit-*` counters.
pub const GENERIC_HEADERS: HeaderFamily = HeaderFamily {
    limit: "x-ratelimit-limit",
    remaining: "x-ratelimit-remaining",
    reset: "x-ratelimit-reset",
};

/// Anthropic request counters.
pub const ANTHROPIC_HEADERS: HeaderFamily = HeaderFamily {
    limit: "anthropic-ratelimit-requests-limit",
    remaining: "anthropic-ratelimit-requests-remaining",
    reset: "anthropic-ratelimit-requests-reset",
};

/// Parsed quota counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Quota {
    pub limit: f64,
    pub remaining: f64,
    pub reset: Option<String>,
}

impl Quota {
    #[must_use]
    pub fn into_report(self, provider: &str) -> UsageReport {
        UsageReport::from_counts(provider, self.limit, self.remaining, self.reset)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<f64> {
    header_str(headers, name).and_then(|value| value.parse::<f64>().ok())
}

/// Read the first family whose limit and remaining headers both parse.
#[must_use]
pub fn parse_quota(headers: &HeaderMap, families: &[HeaderFamily]) -> Option<Quota> {
    families.iter().find_map(|family| {
        let limit = header_number(headers, family.limit)?;
        let remaining = header_number(headers, family.remaining)?;
        Some(Quota {
            limit,
            remaining,
            reset: header_str(headers, family.reset).map(ToString::to_string),
        })
    })
}

/// `Retry-After` in seconds, if present.
#[must_use]
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header_str(headers, RETRY_AFTER.as_str())
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Turn a non-success status into the matching error.
///
/// # Errors
///
/// `RateLimited` for 429, `ProviderApiError` for any other non-2xx status.
pub async fn ensure_success(provider: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let wait = retry_after(response.headers());
        let body = http::body_snippet(response, ERROR_BODY_LIMIT).await;
        return Err(GuardianError::RateLimited {
            provider: provider.to_string(),
            retry_after: wait,
            message: if body.is_empty() { status.to_string() } else { body },
        });
    }

    let body = http::body_snippet(response, ERROR_BODY_LIMIT).await;
    Err(GuardianError::ProviderApiError {
        provider: provider.to_string(),
        status_code: Some(status.as_u16()),
        message: if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        },
    })
}

/// Send `request` and read quota headers from the response.
///
/// # Errors
///
/// Transport errors, non-success statuses, and missing headers.
pub async fn probe_headers(
    provider: &str,
    request: RequestBuilder,
    timeout: Duration,
    families: &[HeaderFamily],
) -> Result<UsageReport> {
    let response = http::send(request, timeout).await?;
    let response = ensure_success(provider, response).await?;

    parse_quota(response.headers(), families)
        .map(|quota| quota.into_report(provider))
        .ok_or_else(|| GuardianError::MissingRateLimit {
            provider: provider.to_string(),
        })
}

/// Collapse a probe result into a report, logging the failure.
#[must_use]
pub fn into_report(provider: &str, result: Result<UsageReport>) -> UsageReport {
    result.unwrap_or_else(|err| {
        tracing::debug!(provider, error_code = err.error_code(), error = %err, "probe failed");
        UsageReport::failure(provider, err.to_string())
    })
}
