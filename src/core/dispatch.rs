//! Notifier abstraction and fan-out.
//!
//! Every enabled channel receives each alert concurrently. A failure or panic
//! in one channel is recorded in its own outcome and never reaches the
//! others. Failed deliveries are not retried.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::join_all;
use serde::Serialize;

use crate::core::models::Alert;
use crate::error::{GuardianError, Result};

/// Result of delivering one alert through one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum NotifyOutcome {
    Delivered,
    Failed(String),
}

impl NotifyOutcome {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl From<Result<()>> for NotifyOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(GuardianError::NotificationFailed { reason, .. }) => Self::Failed(reason),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Delivers alerts through one channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in logs and reports.
    fn name(&self) -> &str;

    async fn notify(&self, alert: &Alert) -> NotifyOutcome;
}

/// Per-channel outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelOutcome {
    pub channel: String,
    #[serde(flatten)]
    pub outcome: NotifyOutcome,
}

/// Outcomes of one alert across all channels, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_delivered()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    #[must_use]
    pub fn all_delivered(&self) -> bool {
        self.failed() == 0
    }
}

/// The enabled notifiers. Read-only once the monitor starts.
#[derive(Clone, Default)]
pub struct NotifierSet {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotifierSet {
    #[must_use]
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    pub fn push(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.notifiers.iter().map(|n| n.name())
    }

    /// Deliver `alert` through every channel concurrently.
    pub async fn dispatch(&self, alert: &Alert) -> DispatchReport {
        let deliveries = self.notifiers.iter().map(|notifier| async move {
            let outcome = AssertUnwindSafe(notifier.notify(alert))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| NotifyOutcome::Failed("notifier panicked".to_string()));

            match &outcome {
                NotifyOutcome::Delivered => {
                    tracing::debug!(channel = notifier.name(), target_name = %alert.target_name, "alert delivered");
                }
                NotifyOutcome::Failed(reason) => {
                    let err = GuardianError::NotificationFailed {
                        channel: notifier.name().to_string(),
                        reason: reason.clone(),
                    };
                    tracing::warn!(
                        channel = notifier.name(),
                        target_name = %alert.target_name,
                        error_code = err.error_code(),
                        "{err}"
                    );
                }
            }

            ChannelOutcome {
                channel: notifier.name().to_string(),
                outcome,
            }
        });

        DispatchReport {
            outcomes: join_all(deliveries).await,
        }
    }
}

impl std::fmt::Debug for NotifierSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
