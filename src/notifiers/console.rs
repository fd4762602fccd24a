//! Stdout channel.

use async_trait::async_trait;
use colored::Colorize;

use crate::core::dispatch::{Notifier, NotifyOutcome};
use crate::core::models::{Alert, Severity};

const CHANNEL: &str = "console";

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// One-line rendering, `{icon} {title}: {message}`.
    #[must_use]
    pub fn render(alert: &Alert) -> String {
        let title = match alert.severity {
            Severity::Critical => alert.title.red().bold(),
            Severity::Warning => alert.title.yellow().bold(),
            Severity::Info => alert.title.green(),
        };
        format!("{} {title}: {}", alert.severity.icon(), alert.message)
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, alert: &Alert) -> NotifyOutcome {
        println!("{}", Self::render(alert));
        NotifyOutcome::Delivered
    }
}
