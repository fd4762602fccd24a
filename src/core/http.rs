//! HTTP client utilities.
//!
//! Provides the shared client used by checkers and HTTP notifiers.

use std::time::Duration;

use reqwest::{Client, ClientBuilder, RequestBuilder, Response};

use crate::error::{GuardianError, Result};

/// Default timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("rate-guardian/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| GuardianError::Network(e.to_string()))
}

/// Send a request, mapping transport failures onto the error taxonomy.
///
/// Non-success statuses are returned as-is; callers decide what a given
/// status means for their provider or channel.
///
/// # Errors
///
/// Returns `Timeout` when the client timeout fired, `Network` otherwise.
pub async fn send(request: RequestBuilder, timeout: Duration) -> Result<Response> {
    request.send().await.map_err(|e| {
        if e.is_timeout() {
            GuardianError::Timeout(timeout.as_secs())
        } else {
            GuardianError::Network(e.to_string())
        }
    })
}

/// Read a response body for error messages, truncated to `max` characters.
pub async fn body_snippet(response: Response, max: usize) -> String {
    let text = response.text().await.unwrap_or_default();
    let trimmed = text.trim();
    if trimmed.chars().count() <= max {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(max).collect();
        format!("{cut}...")
    }
}
