//! `validate`: load the configuration and summarize it.

use std::path::Path;

use crate::cli::args::OutputFormat;
use crate::cli::{LoadedConfig, load_config};
use crate::error::Result;
use crate::notifiers::build_notifiers;
use crate::render::{self, ConfigSummary, TargetSummaryRow};

/// Execute the validate command.
///
/// Channels are built as well, so bad addresses or header names surface here
/// rather than when the first alert fires.
///
/// # Errors
///
/// The first configuration error found.
pub fn execute(
    config_path: Option<&Path>,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<()> {
    let loaded = load_config(config_path)?;
    let notifiers = build_notifiers(&loaded.resolved.notifications, loaded.resolved.http_timeout)?;
    let mut summary = summarize(&loaded);
    summary.channels = notifiers.names().map(ToString::to_string).collect();

    println!(
        "{}",
        render::render_config_summary(&summary, format, pretty, no_color)?
    );
    Ok(())
}

/// Describe a loaded config without revealing credentials.
#[must_use]
pub fn summarize(loaded: &LoadedConfig) -> ConfigSummary {
    let settings = &loaded.resolved.settings;
    ConfigSummary {
        config_path: loaded.path.display().to_string(),
        targets: loaded
            .resolved
            .targets
            .iter()
            .map(|target| TargetSummaryRow {
                name: target.name.clone(),
                provider: target.provider.clone(),
                threshold_percent: target.threshold_percent,
                check_interval_seconds: target.check_interval.as_secs(),
                cooldown_seconds: settings.policy_for(target).cooldown.as_secs(),
                credential: format!("sha256:{}", target.credential.fingerprint()),
            })
            .collect(),
        channels: loaded
            .resolved
            .notifications
            .enabled_channels()
            .into_iter()
            .map(ToString::to_string)
            .collect(),
        hysteresis_margin: settings.hysteresis_margin,
        notify_recovery: settings.notify_recovery,
        timeout_seconds: loaded.config.general.timeout_seconds,
    }
}
