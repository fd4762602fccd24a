//! `run`: the long-running monitor.

use std::path::Path;

use crate::cli::load_config;
use crate::core::checker::CheckerRegistry;
use crate::core::monitor::{Monitor, MonitoredTarget};
use crate::error::Result;
use crate::notifiers::build_notifiers;

/// Start the monitor and block until a termination signal.
///
/// A sustained breach re-alerts only once strictly more than the cooldown
/// has passed since the last alert. Checks land on interval ticks, so with
/// the default cooldown (one check interval) reminders arrive every second
/// check.
///
/// # Errors
///
/// Only configuration errors; once the monitor is running, failures are
/// logged per cycle and never end the process.
pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let loaded = load_config(config_path)?;
    let resolved = loaded.resolved;

    // Everything is resolved before the first task is spawned.
    let targets = MonitoredTarget::resolve_all(
        resolved.targets,
        CheckerRegistry::builtin(),
        resolved.http_timeout,
    )?;
    let notifiers = build_notifiers(&resolved.notifications, resolved.http_timeout)?;

    tracing::info!(
        config = %loaded.path.display(),
        channels = ?notifiers.names().collect::<Vec<_>>(),
        "rate guardian started"
    );

    let handle = Monitor::new(targets, notifiers, resolved.settings).start();
    let report = handle.wait_for_signal().await;

    for summary in &report.completed {
        tracing::info!(
            target_name = %summary.target_name,
            cycles = summary.cycles,
            alerts_sent = summary.alerts_sent,
            is_alerting = summary.is_alerting,
            "target summary"
        );
    }
    if !report.aborted.is_empty() {
        tracing::warn!(aborted = ?report.aborted, "checks abandoned at shutdown");
    }

    Ok(())
}
