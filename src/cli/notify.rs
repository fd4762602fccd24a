//! `test-notify`: send a sample alert through every enabled channel.

use std::path::Path;

use crate::cli::args::OutputFormat;
use crate::cli::load_config;
use crate::core::models::Alert;
use crate::error::{GuardianError, Result};
use crate::notifiers::build_notifiers;
use crate::render;

/// Execute the test-notify command.
///
/// # Errors
///
/// Configuration errors, or `NotificationsFailed` when any channel failed.
pub async fn execute(
    config_path: Option<&Path>,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<()> {
    let loaded = load_config(config_path)?;
    let notifiers = build_notifiers(&loaded.resolved.notifications, loaded.resolved.http_timeout)?;

    tracing::info!(channels = notifiers.len(), "sending test notification");
    let report = notifiers.dispatch(&Alert::test_alert()).await;

    println!("{}", render::render_dispatch(&report, format, pretty, no_color)?);

    if !report.all_delivered() {
        return Err(GuardianError::NotificationsFailed {
            failed: report.failed(),
            total: report.outcomes.len(),
        });
    }
    Ok(())
}
