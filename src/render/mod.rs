//! Output rendering for the one-shot commands.
//!
//! `check`, `validate` and `test-notify` print either a human table or a JSON
//! envelope. The monitor itself only logs.

pub mod error;
pub mod human;
pub mod robot;

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::core::dispatch::DispatchReport;
use crate::core::models::{Target, UsageReport};
use crate::error::Result;

/// One target's reading from `check`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRow {
    pub target_name: String,
    pub threshold_percent: f64,
    pub status: CheckStatus,
    pub report: UsageReport,
}

/// How a single reading compares to its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Over,
    Unknown,
}

impl CheckRow {
    #[must_use]
    pub fn new(target: &Target, report: UsageReport) -> Self {
        let status = match report.usage_percent {
            None => CheckStatus::Unknown,
            Some(usage) if usage >= target.threshold_percent => CheckStatus::Over,
            Some(_) => CheckStatus::Ok,
        };
        Self {
            target_name: target.name.clone(),
            threshold_percent: target.threshold_percent,
            status,
            report,
        }
    }
}

/// What `validate` found in the config file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub config_path: String,
    pub targets: Vec<TargetSummaryRow>,
    pub channels: Vec<String>,
    pub hysteresis_margin: f64,
    pub notify_recovery: bool,
    pub timeout_seconds: u64,
}

/// One target line of [`ConfigSummary`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSummaryRow {
    pub name: String,
    pub provider: String,
    pub threshold_percent: f64,
    pub check_interval_seconds: u64,
    pub cooldown_seconds: u64,
    /// Short SHA-256 of the credential, never the secret itself.
    pub credential: String,
}

/// Render `check` results.
///
/// # Errors
///
/// Fails only if JSON serialization fails.
pub fn render_check(
    rows: &[CheckRow],
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_check(rows, no_color)),
        OutputFormat::Json => robot::render_envelope("check", rows, pretty),
    }
}

/// Render a `validate` summary.
///
/// # Errors
///
/// Fails only if JSON serialization fails.
pub fn render_config_summary(
    summary: &ConfigSummary,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_config_summary(summary, no_color)),
        OutputFormat::Json => robot::render_envelope("validate", summary, pretty),
    }
}

/// Render the per-channel outcome of `test-notify`.
///
/// # Errors
///
/// Fails only if JSON serialization fails.
pub fn render_dispatch(
    report: &DispatchReport,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_dispatch(report, no_color)),
        OutputFormat::Json => robot::render_envelope("test-notify", report, pretty),
    }
}
