//! Core data models, the alert state machine and the monitor loop.

pub mod checker;
pub mod credential;
pub mod dispatch;
pub mod http;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod provider;
pub mod tracker;

pub use checker::{Checker, CheckerFactory, CheckerRegistry, CheckerSpec, guarded_check};
pub use credential::Credential;
pub use dispatch::{ChannelOutcome, DispatchReport, Notifier, NotifierSet, NotifyOutcome};
pub use models::{Alert, AlertKind, Severity, Target, UsageReport};
pub use monitor::{
    Monitor, MonitorHandle, MonitorSettings, MonitoredTarget, ShutdownReport, ShutdownTrigger,
    TargetSummary,
};
pub use provider::Provider;
pub use tracker::{AlertPolicy, AlertState, AlertStateTracker, Evaluation, Transition};
