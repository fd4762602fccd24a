//! Human-readable output using `colored`.

use colored::{ColoredString, Colorize};

use crate::core::dispatch::{DispatchReport, NotifyOutcome};
use crate::render::{CheckRow, CheckStatus, ConfigSummary};
use crate::util::format::{format_count, format_interval, format_percent};

fn paint(text: &str, no_color: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if no_color {
        text.to_string()
    } else {
        style(text).to_string()
    }
}

fn status_label(status: CheckStatus, no_color: bool) -> String {
    match status {
        CheckStatus::Ok => paint("OK", no_color, |s| s.green()),
        CheckStatus::Over => paint("OVER", no_color, |s| s.red().bold()),
        CheckStatus::Unknown => paint("UNKNOWN", no_color, |s| s.yellow()),
    }
}

/// Render `check` rows, one block per target.
#[must_use]
pub fn render_check(rows: &[CheckRow], no_color: bool) -> String {
    let mut output = String::new();

    for row in rows {
        let report = &row.report;
        output.push_str(&format!(
            "{} ({})  {}\n",
            paint(&row.target_name, no_color, |s| s.bold()),
            report.provider,
            status_label(row.status, no_color),
        ));

        match report.usage_percent {
            Some(usage) => {
                output.push_str(&format!(
                    "  usage      {} of threshold {}\n",
                    format_percent(usage),
                    format_percent(row.threshold_percent),
                ));
                if let (Some(used), Some(limit)) = (report.raw_used, report.raw_limit) {
                    output.push_str(&format!(
                        "  requests   {} / {}\n",
                        format_count(used),
                        format_count(limit)
                    ));
                }
                if let Some(reset) = &report.reset {
                    output.push_str(&format!("  resets     {reset}\n"));
                }
            }
            None => {
                let reason = report.provider_error.as_deref().unwrap_or("no usage data");
                output.push_str(&format!(
                    "  error      {}\n",
                    paint(reason, no_color, |s| s.dimmed())
                ));
            }
        }
        output.push('\n');
    }

    output
}

/// Render the `validate` summary.
#[must_use]
pub fn render_config_summary(summary: &ConfigSummary, no_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        paint("Configuration OK:", no_color, |s| s.green().bold()),
        summary.config_path
    ));
    lines.push(String::new());

    lines.push(paint("Targets", no_color, |s| s.bold()));
    for target in &summary.targets {
        lines.push(format!(
            "  {:<20} {:<10} threshold {:>6}  every {:<8} cooldown {:<8} key {}",
            target.name,
            target.provider,
            format_percent(target.threshold_percent),
            format_interval(std::time::Duration::from_secs(target.check_interval_seconds)),
            format_interval(std::time::Duration::from_secs(target.cooldown_seconds)),
            target.credential,
        ));
    }
    lines.push(String::new());

    lines.push(paint("Channels", no_color, |s| s.bold()));
    if summary.channels.is_empty() {
        lines.push(paint(
            "  none enabled (alerts will only be logged)",
            no_color,
            |s| s.yellow(),
        ));
    } else {
        lines.push(format!("  {}", summary.channels.join(", ")));
    }
    lines.push(String::new());

    lines.push(format!(
        "Hysteresis margin {}, recovery notices {}, HTTP timeout {}s",
        format_percent(summary.hysteresis_margin),
        if summary.notify_recovery { "on" } else { "off" },
        summary.timeout_seconds,
    ));

    lines.join("\n")
}

/// Render `test-notify` outcomes.
#[must_use]
pub fn render_dispatch(report: &DispatchReport, no_color: bool) -> String {
    if report.outcomes.is_empty() {
        return "No notification channels are enabled.".to_string();
    }

    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|entry| match &entry.outcome {
            NotifyOutcome::Delivered => format!(
                "  {:<10} {}",
                entry.channel,
                paint("delivered", no_color, |s| s.green())
            ),
            NotifyOutcome::Failed(reason) => format!(
                "  {:<10} {} {reason}",
                entry.channel,
                paint("failed", no_color, |s| s.red().bold())
            ),
        })
        .collect();
    lines.push(format!(
        "{} delivered, {} failed",
        report.delivered(),
        report.failed()
    ));
    lines.join("\n")
}
