//! The monitor loop.
//!
//! Each target runs in its own tokio task on its own interval, owning its
//! checker handle and its [`AlertStateTracker`]. A cycle is check, evaluate,
//! then dispatch; the next tick is not awaited until the cycle finishes, so
//! cycles for one target never overlap. Slow targets only delay themselves.
//!
//! Shutdown is cooperative: the trigger stops new cycles, in-flight cycles
//! get `shutdown_grace` to finish, and whatever is still running after that
//! is aborted. Tracker state is only mutated after a check completes, so an
//! abort cannot leave it half-updated.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior, interval, timeout_at};
use tracing::Instrument;

use crate::core::checker::{Checker, CheckerRegistry, CheckerSpec, guarded_check};
use crate::core::dispatch::NotifierSet;
use crate::core::http::DEFAULT_TIMEOUT;
use crate::core::logging::target_span;
use crate::core::models::Target;
use crate::core::tracker::{AlertPolicy, AlertState, AlertStateTracker, DEFAULT_HYSTERESIS_MARGIN, Transition};
use crate::error::Result;

/// Extra time a check gets on top of its HTTP timeout before it is abandoned.
const CHECK_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Default wait for in-flight cycles at shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Longest grace honoured at shutdown, whatever the settings say.
const MAX_SHUTDOWN_GRACE: Duration = Duration::from_secs(24 * 60 * 60);

// =============================================================================
// Settings
// =============================================================================

/// Monitor-wide tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub hysteresis_margin: f64,
    /// Re-alert cooldown. `None` uses each target's check interval.
    pub realert_cooldown: Option<Duration>,
    pub notify_recovery: bool,
    /// Upper bound on one `check()` call.
    pub check_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            hysteresis_margin: DEFAULT_HYSTERESIS_MARGIN,
            realert_cooldown: None,
            notify_recovery: true,
            check_timeout: DEFAULT_TIMEOUT + CHECK_TIMEOUT_SLACK,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl MonitorSettings {
    /// Check budget derived from the HTTP timeout.
    #[must_use]
    pub fn check_timeout_for(http_timeout: Duration) -> Duration {
        http_timeout + CHECK_TIMEOUT_SLACK
    }

    /// Alert policy for one target.
    #[must_use]
    pub fn policy_for(&self, target: &Target) -> AlertPolicy {
        AlertPolicy {
            hysteresis_margin: self.hysteresis_margin,
            cooldown: self.realert_cooldown.unwrap_or(target.check_interval),
            notify_recovery: self.notify_recovery,
        }
    }
}

// =============================================================================
// Targets
// =============================================================================

/// A target paired with the checker that polls it.
#[derive(Clone)]
pub struct MonitoredTarget {
    pub target: Target,
    pub checker: Arc<dyn Checker>,
}

impl MonitoredTarget {
    #[must_use]
    pub fn new(target: Target, checker: Arc<dyn Checker>) -> Self {
        Self { target, checker }
    }

    /// Build the checker for `target` from `registry`.
    ///
    /// # Errors
    ///
    /// Fails when the provider is not registered or its factory rejects the
    /// target.
    pub fn resolve(target: Target, registry: &CheckerRegistry, http_timeout: Duration) -> Result<Self> {
        let spec = CheckerSpec {
            credential: target.credential.clone(),
            base_url: target.base_url.clone(),
            organization: target.organization.clone(),
            timeout: http_timeout,
        };
        let checker = registry.create(&target.provider, &spec)?;
        Ok(Self { target, checker })
    }

    /// Resolve every target, failing on the first bad one.
    ///
    /// # Errors
    ///
    /// See [`MonitoredTarget::resolve`].
    pub fn resolve_all(
        targets: Vec<Target>,
        registry: &CheckerRegistry,
        http_timeout: Duration,
    ) -> Result<Vec<Self>> {
        targets
            .into_iter()
            .map(|target| Self::resolve(target, registry, http_timeout))
            .collect()
    }
}

// =============================================================================
// Shutdown
// =============================================================================

/// Cloneable handle that stops the monitor. Safe to call from a signal task.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownTrigger {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Stop scheduling new cycles. Idempotent.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

/// What one target's task did before it stopped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSummary {
    pub target_name: String,
    pub cycles: u64,
    pub alerts_sent: u64,
    pub is_alerting: bool,
    pub last_usage_percent: Option<f64>,
}

impl TargetSummary {
    fn new(target_name: &str, cycles: u64, alerts_sent: u64, state: &AlertState) -> Self {
        Self {
            target_name: target_name.to_string(),
            cycles,
            alerts_sent,
            is_alerting: state.is_alerting,
            last_usage_percent: state.last_usage_percent,
        }
    }
}

/// Outcome of [`MonitorHandle::shutdown`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutdownReport {
    /// Targets that stopped cleanly, in completion order.
    pub completed: Vec<TargetSummary>,
    /// Targets whose in-flight cycle outlived the grace period.
    pub aborted: Vec<String>,
}

impl ShutdownReport {
    #[must_use]
    pub fn summary(&self, target_name: &str) -> Option<&TargetSummary> {
        self.completed.iter().find(|s| s.target_name == target_name)
    }
}

// =============================================================================
// Monitor
// =============================================================================

/// Owns the targets and notifiers until started.
pub struct Monitor {
    targets: Vec<MonitoredTarget>,
    notifiers: Arc<NotifierSet>,
    settings: MonitorSettings,
}

impl Monitor {
    #[must_use]
    pub fn new(targets: Vec<MonitoredTarget>, notifiers: NotifierSet, settings: MonitorSettings) -> Self {
        Self {
            targets,
            notifiers: Arc::new(notifiers),
            settings,
        }
    }

    /// Spawn one polling task per target. Must be called inside a tokio
    /// runtime.
    #[must_use]
    pub fn start(self) -> MonitorHandle {
        let trigger = ShutdownTrigger::new();
        let mut tasks = JoinSet::new();
        let mut names = Vec::with_capacity(self.targets.len());

        tracing::info!(
            targets = self.targets.len(),
            channels = self.notifiers.len(),
            "monitor starting"
        );

        for entry in self.targets {
            names.push(entry.target.name.clone());
            let policy = self.settings.policy_for(&entry.target);
            let worker = TargetWorker {
                tracker: AlertStateTracker::new(
                    entry.target.name.clone(),
                    entry.target.threshold_percent,
                    policy,
                ),
                target: entry.target,
                checker: entry.checker,
                notifiers: Arc::clone(&self.notifiers),
                check_timeout: self.settings.check_timeout,
                cycles: 0,
                alerts_sent: 0,
            };
            let span = target_span(&worker.target);
            tasks.spawn(worker.run(trigger.subscribe()).instrument(span));
        }

        MonitorHandle {
            trigger,
            tasks,
            names,
            shutdown_grace: self.settings.shutdown_grace,
        }
    }
}

/// Handle to a running monitor.
pub struct MonitorHandle {
    trigger: ShutdownTrigger,
    tasks: JoinSet<TargetSummary>,
    names: Vec<String>,
    shutdown_grace: Duration,
}

impl MonitorHandle {
    #[must_use]
    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        self.trigger.clone()
    }

    /// Stop the monitor, wait up to the grace period for in-flight cycles,
    /// then abort the rest.
    pub async fn shutdown(mut self) -> ShutdownReport {
        self.trigger.shutdown();
        let grace = self.shutdown_grace.min(MAX_SHUTDOWN_GRACE);
        let deadline = Instant::now() + grace;
        let mut report = ShutdownReport::default();

        loop {
            match timeout_at(deadline, self.tasks.join_next()).await {
                Ok(Some(Ok(summary))) => report.completed.push(summary),
                Ok(Some(Err(err))) => {
                    tracing::error!(error = %err, "target task failed");
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        remaining = self.tasks.len(),
                        grace_secs = grace.as_secs(),
                        "grace period elapsed, aborting in-flight checks"
                    );
                    self.tasks.abort_all();
                    while self.tasks.join_next().await.is_some() {}
                    break;
                }
            }
        }

        let finished: HashSet<&str> = report
            .completed
            .iter()
            .map(|s| s.target_name.as_str())
            .collect();
        report.aborted = self
            .names
            .iter()
            .filter(|name| !finished.contains(name.as_str()))
            .cloned()
            .collect();

        tracing::info!(
            completed = report.completed.len(),
            aborted = report.aborted.len(),
            "monitor stopped"
        );
        report
    }

    /// Run until Ctrl+C, SIGTERM, or a [`ShutdownTrigger`] fires, then shut
    /// down.
    pub async fn wait_for_signal(self) -> ShutdownReport {
        let mut triggered = self.trigger.subscribe();
        tokio::select! {
            () = termination_signal() => {
                tracing::info!("termination signal received");
            }
            _ = triggered.wait_for(|stop| *stop) => {}
        }
        self.shutdown().await
    }
}

async fn termination_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

// =============================================================================
// Per-target task
// =============================================================================

struct TargetWorker {
    target: Target,
    checker: Arc<dyn Checker>,
    tracker: AlertStateTracker,
    notifiers: Arc<NotifierSet>,
    check_timeout: Duration,
    cycles: u64,
    alerts_sent: u64,
}

impl TargetWorker {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> TargetSummary {
        let mut ticker = interval(self.target.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(
            interval_secs = self.target.check_interval.as_secs(),
            threshold = self.target.threshold_percent,
            "target scheduled"
        );

        loop {
            let tick = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                tick = ticker.tick() => tick,
            };

            self.run_cycle(tick).await;
        }

        tracing::debug!(cycles = self.cycles, "target stopped");
        TargetSummary::new(&self.target.name, self.cycles, self.alerts_sent, self.tracker.state())
    }

    async fn run_cycle(&mut self, tick: Instant) {
        self.cycles += 1;
        let name = self.target.name.as_str();
        let report = guarded_check(self.checker.as_ref(), name, self.check_timeout).await;

        match (&report.usage_percent, &report.provider_error) {
            (Some(usage), _) => {
                tracing::info!(
                    usage_percent = *usage,
                    threshold = self.target.threshold_percent,
                    "usage checked"
                );
            }
            (None, error) => {
                tracing::warn!(
                    error = error.as_deref().unwrap_or("no usage data"),
                    "check failed, skipping cycle"
                );
            }
        }

        let evaluation = self.tracker.evaluate(&report, tick);
        if !matches!(evaluation.transition, Transition::Skipped | Transition::Unchanged) {
            tracing::debug!(
                transition = evaluation.transition.as_str(),
                "alert state evaluated"
            );
        }

        if let Some(alert) = evaluation.alert {
            self.alerts_sent += 1;
            tracing::info!(
                kind = alert.kind.as_str(),
                severity = alert.severity.as_str(),
                "dispatching alert"
            );
            let outcome = self.notifiers.dispatch(&alert).await;
            if !outcome.all_delivered() {
                tracing::warn!(
                    delivered = outcome.delivered(),
                    failed = outcome.failed(),
                    "alert not delivered on every channel"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::AlertKind;
    use crate::test_utils::{RecordingNotifier, ScriptedChecker, make_test_target};

    fn settings() -> MonitorSettings {
        MonitorSettings {
            check_timeout: Duration::from_secs(5),
            shutdown_grace: Duration::from_secs(2),
            ..MonitorSettings::default()
        }
    }

    #[test]
    fn cooldown_defaults_to_interval() {
        let target = make_test_target("main", 80.0, Duration::from_secs(45));
        let policy = MonitorSettings::default().policy_for(&target);
        assert_eq!(policy.cooldown, Duration::from_secs(45));

        let explicit = MonitorSettings {
            realert_cooldown: Some(Duration::from_secs(600)),
            ..MonitorSettings::default()
        };
        assert_eq!(explicit.policy_for(&target).cooldown, Duration::from_secs(600));
    }

    #[test]
    fn resolve_rejects_unknown_provider() {
        let mut target = make_test_target("main", 80.0, Duration::from_secs(60));
        target.provider = "acme".to_string();
        let err = MonitoredTarget::resolve(target, CheckerRegistry::builtin(), DEFAULT_TIMEOUT)
            .err()
            .unwrap();
        assert!(err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn alerts_once_then_recovers() {
        let checker = Arc::new(ScriptedChecker::new(
            "openai",
            vec![Some(70.0), Some(82.0), Some(84.0), Some(60.0)],
        ));
        let recorder = Arc::new(RecordingNotifier::new("recorder"));
        let target = make_test_target("main", 80.0, Duration::from_secs(60));

        let handle = Monitor::new(
            vec![MonitoredTarget::new(target, checker.clone())],
            NotifierSet::new(vec![recorder.clone()]),
            settings(),
        )
        .start();

        tokio::time::sleep(Duration::from_secs(181)).await;
        let report = handle.shutdown().await;

        assert_eq!(checker.calls(), 4);
        let kinds: Vec<_> = recorder.alerts().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Breach, AlertKind::Recovery]);

        let summary = report.summary("main").unwrap();
        assert_eq!(summary.cycles, 4);
        assert_eq!(summary.alerts_sent, 2);
        assert!(!summary.is_alerting);
        assert!(report.aborted.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn default_cooldown_reminds_every_second_check() {
        let checker = Arc::new(ScriptedChecker::new("openai", vec![Some(90.0)]));
        let recorder = Arc::new(RecordingNotifier::new("recorder"));
        let target = make_test_target("main", 80.0, Duration::from_secs(10));
        let handle = Monitor::new(
            vec![MonitoredTarget::new(target, checker.clone())],
            NotifierSet::new(vec![recorder.clone()]),
            settings(),
        )
        .start();

        tokio::time::sleep(Duration::from_secs(41)).await;
        handle.shutdown().await;

        assert_eq!(checker.calls(), 5);
        let kinds: Vec<_> = recorder.alerts().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Breach, AlertKind::Reminder, AlertKind::Reminder]);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_grace_does_not_overflow() {
        let checker = Arc::new(ScriptedChecker::new("openai", vec![Some(10.0)]));
        let target = make_test_target("main", 80.0, Duration::from_secs(10));
        let handle = Monitor::new(
            vec![MonitoredTarget::new(target, checker)],
            NotifierSet::default(),
            MonitorSettings {
                shutdown_grace: Duration::MAX,
                ..settings()
            },
        )
        .start();

        tokio::time::sleep(Duration::from_secs(1)).await;
        let report = handle.shutdown().await;
        assert_eq!(report.completed.len(), 1);
        assert!(report.aborted.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_stops_scheduling() {
        let checker = Arc::new(ScriptedChecker::new("openai", vec![Some(10.0)]));
        let target = make_test_target("main", 80.0, Duration::from_secs(10));
        let handle = Monitor::new(
            vec![MonitoredTarget::new(target, checker.clone())],
            NotifierSet::default(),
            settings(),
        )
        .start();

        tokio::time::sleep(Duration::from_secs(1)).await;
        let trigger = handle.shutdown_trigger();
        trigger.shutdown();
        assert!(trigger.is_triggered());

        let report = handle.wait_for_signal().await;
        assert_eq!(checker.calls(), 1);
        assert_eq!(report.completed.len(), 1);
    }
}
