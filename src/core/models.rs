//! Data models shared by checkers, the alert tracker and notifiers.
//!
//! `UsageReport` is what a checker produces each cycle, `Alert` is what the
//! tracker hands to notifiers when a transition fires.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::credential::Credential;

/// Usage at or above this percentage is reported as critical.
pub const CRITICAL_PERCENT: f64 = 90.0;

// =============================================================================
// Target
// =============================================================================

/// One configured monitoring unit. Immutable once built from config.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    /// Registry id of the checker (`openai`, `github`, ...).
    pub provider: String,
    pub threshold_percent: f64,
    pub check_interval: Duration,
    pub credential: Credential,
    /// Overrides the provider's default API base.
    pub base_url: Option<String>,
    pub organization: Option<String>,
}

// =============================================================================
// Usage Report
// =============================================================================

/// Normalized snapshot of a provider's quota consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub provider: String,
    /// Percent of the quota consumed; `None` when unknown.
    pub usage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<f64>,
    /// Provider supplied reset hint, passed through verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_error: Option<String>,
}

impl UsageReport {
    /// Build a report from a limit/remaining pair.
    ///
    /// A non-positive limit yields an unknown reading. Usage is clamped to
    /// `[0, 100]` because providers occasionally report `remaining > limit`
    /// right after a window resets.
    #[must_use]
    pub fn from_counts(
        provider: impl Into<String>,
        limit: f64,
        remaining: f64,
        reset: Option<String>,
    ) -> Self {
        let provider = provider.into();
        if !limit.is_finite() || !remaining.is_finite() || limit <= 0.0 {
            return Self::failure(provider, format!("invalid quota limit {limit}"));
        }

        let used = limit - remaining;
        let percent = (used / limit * 100.0).clamp(0.0, 100.0);

        Self {
            provider,
            usage_percent: Some(percent),
            raw_used: Some(used),
            raw_limit: Some(limit),
            remaining: Some(remaining),
            reset,
            timestamp: Utc::now(),
            provider_error: None,
        }
    }

    /// An unknown reading carrying the reason it could not be determined.
    #[must_use]
    pub fn failure(provider: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            usage_percent: None,
            raw_used: None,
            raw_limit: None,
            remaining: None,
            reset: None,
            timestamp: Utc::now(),
            provider_error: Some(error.into()),
        }
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.usage_percent.is_none()
    }
}

// =============================================================================
// Alerts
// =============================================================================

/// What kind of transition produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Usage crossed the threshold.
    Breach,
    /// Usage is still above the threshold after the cooldown elapsed.
    Reminder,
    /// Usage fell below the hysteresis band.
    Recovery,
}

impl AlertKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breach => "breach",
            Self::Reminder => "reminder",
            Self::Recovery => "recovery",
        }
    }
}

/// Alert severity, derived from kind and usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn classify(kind: AlertKind, usage_percent: f64) -> Self {
        match kind {
            AlertKind::Recovery => Self::Info,
            _ if usage_percent >= CRITICAL_PERCENT => Self::Critical,
            _ => Self::Warning,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Emoji used by chat-style channels.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Info => "✅",
            Self::Warning => "⚠️",
            Self::Critical => "🚨",
        }
    }
}

/// Value object handed to notifiers. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub target_name: String,
    pub provider: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub usage_percent: f64,
    pub threshold_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_limit: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub message: String,
}

impl Alert {
    /// Build an alert for `target` from the report that triggered it.
    #[must_use]
    pub fn new(
        kind: AlertKind,
        target_name: &str,
        threshold_percent: f64,
        report: &UsageReport,
        usage_percent: f64,
    ) -> Self {
        let severity = Severity::classify(kind, usage_percent);
        let title = match kind {
            AlertKind::Breach => format!("{target_name} usage above threshold"),
            AlertKind::Reminder => format!("{target_name} usage still above threshold"),
            AlertKind::Recovery => format!("{target_name} usage recovered"),
        };

        let mut message = format!(
            "{} usage is {usage_percent:.1}% (threshold {threshold_percent:.1}%)",
            report.provider
        );
        if let (Some(used), Some(limit)) = (report.raw_used, report.raw_limit) {
            message.push_str(&format!(", {used:.0}/{limit:.0} used"));
        }
        if let Some(reset) = &report.reset {
            message.push_str(&format!(", resets {reset}"));
        }

        Self {
            target_name: target_name.to_string(),
            provider: report.provider.clone(),
            kind,
            severity,
            usage_percent,
            threshold_percent,
            raw_used: report.raw_used,
            raw_limit: report.raw_limit,
            timestamp: report.timestamp,
            title,
            message,
        }
    }

    /// Synthetic alert used by `test-notify`.
    #[must_use]
    pub fn test_alert() -> Self {
        Self {
            target_name: "rate-guardian".to_string(),
            provider: "test".to_string(),
            kind: AlertKind::Breach,
            severity: Severity::Warning,
            usage_percent: 85.0,
            threshold_percent: 80.0,
            raw_used: Some(850.0),
            raw_limit: Some(1000.0),
            timestamp: Utc::now(),
            title: "Test notification".to_string(),
            message: "If you can read this, the channel is configured correctly.".to_string(),
        }
    }
}
