//! Per-target alert state machine.
//!
//! Two states, `Normal` and `Alerting`. Entering `Alerting` fires one alert;
//! leaving it requires usage to drop below `threshold - hysteresis_margin`.
//! While a breach is sustained, further alerts are suppressed until more than
//! the cooldown has elapsed since the last one. Unknown readings never change
//! anything.

use std::time::Duration;

use tokio::time::Instant;

use crate::core::models::{Alert, AlertKind, UsageReport};

/// Default hysteresis margin in percentage points.
pub const DEFAULT_HYSTERESIS_MARGIN: f64 = 5.0;

/// Tuning knobs shared by every tracker in a monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPolicy {
    pub hysteresis_margin: f64,
    pub cooldown: Duration,
    pub notify_recovery: bool,
}

impl AlertPolicy {
    /// Policy with the default margin, recovery notices on, and `cooldown`.
    #[must_use]
    pub const fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            hysteresis_margin: DEFAULT_HYSTERESIS_MARGIN,
            cooldown,
            notify_recovery: true,
        }
    }
}

/// Mutable per-target state. Only [`AlertStateTracker::evaluate`] changes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertState {
    pub is_alerting: bool,
    pub last_alert_at: Option<Instant>,
    /// Last known reading; `None` until the first known one.
    pub last_usage_percent: Option<f64>,
}

/// What one evaluation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Reading was unknown; nothing changed.
    Skipped,
    /// Normal and below threshold.
    Unchanged,
    /// Normal to Alerting.
    Triggered,
    /// Still breaching, inside the cooldown window.
    Suppressed,
    /// Still breaching, cooldown elapsed, reminder sent.
    Repeated,
    /// Alerting, below threshold but inside the hysteresis band.
    Holding,
    /// Alerting to Normal.
    Recovered,
}

impl Transition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Unchanged => "unchanged",
            Self::Triggered => "triggered",
            Self::Suppressed => "suppressed",
            Self::Repeated => "repeated",
            Self::Holding => "holding",
            Self::Recovered => "recovered",
        }
    }
}

/// Result of [`AlertStateTracker::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub transition: Transition,
    pub alert: Option<Alert>,
}

/// Alert state machine for one target.
#[derive(Debug, Clone)]
pub struct AlertStateTracker {
    target_name: String,
    threshold_percent: f64,
    policy: AlertPolicy,
    state: AlertState,
}

impl AlertStateTracker {
    #[must_use]
    pub fn new(target_name: impl Into<String>, threshold_percent: f64, policy: AlertPolicy) -> Self {
        Self {
            target_name: target_name.into(),
            threshold_percent,
            policy,
            state: AlertState::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AlertState {
        &self.state
    }

    #[must_use]
    pub const fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Usage below this clears an active alert.
    #[must_use]
    pub fn recovery_level(&self) -> f64 {
        self.threshold_percent - self.policy.hysteresis_margin
    }

    /// Feed one reading observed at `now`.
    pub fn evaluate(&mut self, report: &UsageReport, now: Instant) -> Evaluation {
        let Some(usage) = report.usage_percent else {
            return Evaluation {
                transition: Transition::Skipped,
                alert: None,
            };
        };

        let breaching = usage >= self.threshold_percent;
        let (transition, kind) = if self.state.is_alerting {
            if breaching {
                if self.cooldown_elapsed(now) {
                    (Transition::Repeated, Some(AlertKind::Reminder))
                } else {
                    (Transition::Suppressed, None)
                }
            } else if usage < self.recovery_level() {
                let kind = self.policy.notify_recovery.then_some(AlertKind::Recovery);
                (Transition::Recovered, kind)
            } else {
                (Transition::Holding, None)
            }
        } else if breaching {
            (Transition::Triggered, Some(AlertKind::Breach))
        } else {
            (Transition::Unchanged, None)
        };

        match transition {
            Transition::Triggered | Transition::Repeated => {
                self.state.is_alerting = true;
                self.state.last_alert_at = Some(now);
            }
            Transition::Recovered => self.state.is_alerting = false,
            _ => {}
        }
        self.state.last_usage_percent = Some(usage);

        let alert = kind.map(|kind| {
            Alert::new(kind, &self.target_name, self.threshold_percent, report, usage)
        });
        Evaluation { transition, alert }
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        self.state
            .last_alert_at
            .is_none_or(|at| now.saturating_duration_since(at) > self.policy.cooldown)
    }
}
