//! Configuration file loading and validation.
//!
//! Loads configuration from (first match wins):
//! 1. `--config <PATH>`
//! 2. `GUARDIAN_CONFIG`
//! 3. Linux/macOS: `~/.config/rate-guardian/config.toml`,
//!    Windows: `%APPDATA%/rate-guardian/config.toml`
//!
//! ## Environment Placeholders
//!
//! String values may reference `${NAME}`. Placeholders are expanded only in
//! fields that are actually used: credentials and endpoints of every target,
//! and settings of enabled notification channels. A placeholder whose
//! variable is unset is a configuration error.
//!
//! ## Example
//!
//! ```toml
//! [general]
//! timeout_seconds = 10
//!
//! [monitor]
//! hysteresis_margin = 5.0
//! # Reminders need strictly more than this many seconds since the last
//! # alert. Checks land on interval ticks, so with the default (the
//! # target's check_interval) a sustained breach re-alerts every second
//! # interval.
//! # realert_cooldown_seconds = 300
//! notify_recovery = true
//!
//! [[targets]]
//! name = "openai-main"
//! provider = "openai"
//! api_key = "${OPENAI_API_KEY}"
//! threshold = 80
//! check_interval = 60
//!
//! [notifications.telegram]
//! enabled = true
//! token = "${TELEGRAM_BOT_TOKEN}"
//! chat_id = "123456"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::core::checker::CheckerRegistry;
use crate::core::credential::Credential;
use crate::core::models::Target;
use crate::core::monitor::MonitorSettings;
use crate::error::{GuardianError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "GUARDIAN_CONFIG";

const MAX_TIMEOUT_SECONDS: u64 = 300;
/// Upper bound on the shutdown grace period.
const MAX_SHUTDOWN_GRACE_SECONDS: u64 = 300;
/// Upper bound on check intervals and the re-alert cooldown (one week).
const MAX_INTERVAL_SECONDS: u64 = 7 * 24 * 60 * 60;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

// =============================================================================
// Config File Structure
// =============================================================================

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub monitor: MonitorConfig,
    pub targets: Vec<TargetConfig>,
    pub notifications: NotificationsConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// HTTP timeout for provider and channel requests.
    pub timeout_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { timeout_seconds: 10 }
    }
}

/// Alerting and scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Percentage points below threshold required to clear an alert.
    pub hysteresis_margin: f64,
    /// Seconds that must be strictly exceeded between reminders for a
    /// sustained breach. Defaults to each target's check interval, which
    /// means a reminder every second check.
    pub realert_cooldown_seconds: Option<u64>,
    pub notify_recovery: bool,
    /// How long in-flight cycles may run after a shutdown signal.
    pub shutdown_grace_seconds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            hysteresis_margin: 5.0,
            realert_cooldown_seconds: None,
            notify_recovery: true,
            shutdown_grace_seconds: 10,
        }
    }
}

/// One `[[targets]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Display name; defaults to the provider id.
    #[serde(default)]
    pub name: Option<String>,
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Seconds between checks.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

const fn default_threshold() -> f64 {
    80.0
}

const fn default_check_interval() -> u64 {
    60
}

impl TargetConfig {
    /// Name used in logs and alerts.
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.provider)
    }
}

/// `[notifications.*]` tables. Absent tables are disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub telegram: Option<TelegramConfig>,
    pub email: Option<EmailConfig>,
    pub webhook: Option<WebhookConfig>,
    pub bark: Option<BarkConfig>,
    pub console: Option<ConsoleConfig>,
}

/// Telegram bot channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: String,
    pub chat_id: String,
    /// Bot API base, for self-hosted Bot API servers.
    pub api_base: Option<String>,
}

/// SMTP channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub to_email: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
            to_email: String::new(),
        }
    }
}

/// Generic HTTP webhook channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    pub url: String,
    /// `POST` (JSON body) or `GET` (query string).
    pub method: String,
    pub headers: BTreeMap<String, String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            method: "POST".to_string(),
            headers: BTreeMap::new(),
        }
    }
}

/// Bark (iOS push) channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarkConfig {
    pub enabled: bool,
    pub key: String,
    /// Host name, or a full base URL including the scheme.
    pub server: String,
}

impl Default for BarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key: String::new(),
            server: "api.day.app".to_string(),
        }
    }
}

/// Stdout channel, mostly for trying things out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
}

// =============================================================================
// Loading
// =============================================================================

impl Config {
    /// Pick the config path: explicit flag, then `GUARDIAN_CONFIG`, then the
    /// platform default.
    #[must_use]
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        std::env::var(ENV_CONFIG)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| AppPaths::new().config_file(), PathBuf::from)
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// `ConfigNotFound` if the file does not exist, `ConfigParse` if it is not
    /// valid TOML for this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GuardianError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|message| GuardianError::ConfigParse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parse TOML text.
    ///
    /// # Errors
    ///
    /// Returns the parser's message on failure.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Validate structure and ranges. Placeholders are not expanded here.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn validate(&self, registry: &CheckerRegistry) -> Result<()> {
        if self.general.timeout_seconds == 0 || self.general.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(invalid(
                "general.timeout_seconds",
                format!("must be between 1 and {MAX_TIMEOUT_SECONDS} seconds"),
            ));
        }

        let margin = self.monitor.hysteresis_margin;
        if !(0.0..100.0).contains(&margin) {
            return Err(invalid("monitor.hysteresis_margin", "must be in [0, 100)"));
        }
        if self
            .monitor
            .realert_cooldown_seconds
            .is_some_and(|cooldown| !(1..=MAX_INTERVAL_SECONDS).contains(&cooldown))
        {
            return Err(invalid(
                "monitor.realert_cooldown_seconds",
                format!("must be between 1 and {MAX_INTERVAL_SECONDS} seconds"),
            ));
        }
        if !(1..=MAX_SHUTDOWN_GRACE_SECONDS).contains(&self.monitor.shutdown_grace_seconds) {
            return Err(invalid(
                "monitor.shutdown_grace_seconds",
                format!("must be between 1 and {MAX_SHUTDOWN_GRACE_SECONDS} seconds"),
            ));
        }

        if self.targets.is_empty() {
            return Err(GuardianError::NoTargets);
        }

        let mut seen = HashSet::new();
        for (index, target) in self.targets.iter().enumerate() {
            let name = target.effective_name();
            if !seen.insert(name.to_string()) {
                return Err(GuardianError::DuplicateTarget {
                    name: name.to_string(),
                });
            }
            if !registry.contains(&target.provider) {
                return Err(GuardianError::UnknownProvider {
                    provider: target.provider.clone(),
                    known: registry.ids().collect::<Vec<_>>().join(", "),
                });
            }
            if target.api_key.trim().is_empty() {
                return Err(GuardianError::MissingCredential {
                    target: name.to_string(),
                });
            }
            if !(target.threshold > 0.0 && target.threshold <= 100.0) {
                return Err(invalid(
                    &format!("targets[{index}].threshold"),
                    "must be in (0, 100]",
                ));
            }
            if target.threshold <= margin {
                return Err(invalid(
                    &format!("targets[{index}].threshold"),
                    format!(
                        "must exceed monitor.hysteresis_margin ({margin}) or the alert can never clear"
                    ),
                ));
            }
            if !(1..=MAX_INTERVAL_SECONDS).contains(&target.check_interval) {
                return Err(invalid(
                    &format!("targets[{index}].check_interval"),
                    format!("must be between 1 and {MAX_INTERVAL_SECONDS} seconds"),
                ));
            }
        }

        self.notifications.validate()
    }

    /// Expand placeholders and build runtime values, reading the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Validation errors, or `EnvVarMissing` for an unset placeholder.
    pub fn resolve(&self, registry: &CheckerRegistry) -> Result<ResolvedConfig> {
        self.resolve_with(registry, |name| std::env::var(name).ok())
    }

    /// [`Config::resolve`] with an explicit variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Config::resolve`].
    pub fn resolve_with<F>(&self, registry: &CheckerRegistry, lookup: F) -> Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.validate(registry)?;

        let http_timeout = Duration::from_secs(self.general.timeout_seconds);
        let mut targets = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let name = target.effective_name().to_string();
            let key = expand_env_with(&target.api_key, &lookup)?;
            if key.trim().is_empty() {
                return Err(GuardianError::MissingCredential { target: name });
            }
            targets.push(Target {
                name,
                provider: target.provider.trim().to_lowercase(),
                threshold_percent: target.threshold,
                check_interval: Duration::from_secs(target.check_interval),
                credential: Credential::new(key),
                base_url: expand_opt(target.base_url.as_deref(), &lookup)?,
                organization: expand_opt(target.organization.as_deref(), &lookup)?,
            });
        }

        let settings = MonitorSettings {
            hysteresis_margin: self.monitor.hysteresis_margin,
            realert_cooldown: self.monitor.realert_cooldown_seconds.map(Duration::from_secs),
            notify_recovery: self.monitor.notify_recovery,
            check_timeout: MonitorSettings::check_timeout_for(http_timeout),
            shutdown_grace: Duration::from_secs(self.monitor.shutdown_grace_seconds),
        };

        Ok(ResolvedConfig {
            targets,
            settings,
            http_timeout,
            notifications: self.notifications.expand(&lookup)?,
        })
    }
}

impl NotificationsConfig {
    /// Names of enabled channels, in dispatch order.
    #[must_use]
    pub fn enabled_channels(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.telegram.as_ref().is_some_and(|c| c.enabled) {
            names.push("telegram");
        }
        if self.email.as_ref().is_some_and(|c| c.enabled) {
            names.push("email");
        }
        if self.webhook.as_ref().is_some_and(|c| c.enabled) {
            names.push("webhook");
        }
        if self.bark.as_ref().is_some_and(|c| c.enabled) {
            names.push("bark");
        }
        if self.console.as_ref().is_some_and(|c| c.enabled) {
            names.push("console");
        }
        names
    }

    fn validate(&self) -> Result<()> {
        if let Some(telegram) = self.telegram.as_ref().filter(|c| c.enabled) {
            require("notifications.telegram.token", &telegram.token)?;
            require("notifications.telegram.chat_id", &telegram.chat_id)?;
        }
        if let Some(email) = self.email.as_ref().filter(|c| c.enabled) {
            require("notifications.email.smtp_host", &email.smtp_host)?;
            require("notifications.email.from_email", &email.from_email)?;
            require("notifications.email.to_email", &email.to_email)?;
            if email.smtp_port == 0 {
                return Err(invalid("notifications.email.smtp_port", "must be positive"));
            }
        }
        if let Some(webhook) = self.webhook.as_ref().filter(|c| c.enabled) {
            require("notifications.webhook.url", &webhook.url)?;
            if !matches!(webhook.method.to_uppercase().as_str(), "GET" | "POST") {
                return Err(invalid(
                    "notifications.webhook.method",
                    format!("'{}' is not GET or POST", webhook.method),
                ));
            }
        }
        if let Some(bark) = self.bark.as_ref().filter(|c| c.enabled) {
            require("notifications.bark.key", &bark.key)?;
            require("notifications.bark.server", &bark.server)?;
        }
        Ok(())
    }

    /// Copy with placeholders expanded in enabled channels only.
    fn expand<F>(&self, lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = self.clone();
        if let Some(c) = out.telegram.as_mut().filter(|c| c.enabled) {
            c.token = expand_env_with(&c.token, lookup)?;
            c.chat_id = expand_env_with(&c.chat_id, lookup)?;
            c.api_base = expand_opt(c.api_base.as_deref(), lookup)?;
        }
        if let Some(c) = out.email.as_mut().filter(|c| c.enabled) {
            c.smtp_host = expand_env_with(&c.smtp_host, lookup)?;
            c.username = expand_env_with(&c.username, lookup)?;
            c.password = expand_env_with(&c.password, lookup)?;
            c.from_email = expand_env_with(&c.from_email, lookup)?;
            c.to_email = expand_env_with(&c.to_email, lookup)?;
        }
        if let Some(c) = out.webhook.as_mut().filter(|c| c.enabled) {
            c.url = expand_env_with(&c.url, lookup)?;
            for value in c.headers.values_mut() {
                *value = expand_env_with(value, lookup)?;
            }
        }
        if let Some(c) = out.bark.as_mut().filter(|c| c.enabled) {
            c.key = expand_env_with(&c.key, lookup)?;
            c.server = expand_env_with(&c.server, lookup)?;
        }
        Ok(out)
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Runtime values built from a validated config.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub targets: Vec<Target>,
    pub settings: MonitorSettings,
    pub http_timeout: Duration,
    /// Channel settings with placeholders expanded.
    pub notifications: NotificationsConfig,
}

// =============================================================================
// Helpers
// =============================================================================

fn invalid(key: &str, message: impl Into<String>) -> GuardianError {
    GuardianError::ConfigInvalid {
        key: key.to_string(),
        message: message.into(),
    }
}

fn require(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(invalid(key, "is required when the channel is enabled"))
    } else {
        Ok(())
    }
}

/// Replace every `${NAME}` in `value` using `lookup`.
///
/// # Errors
///
/// `EnvVarMissing` naming the first unset variable.
pub fn expand_env_with<F>(value: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(value) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let resolved = lookup(name.as_str()).ok_or_else(|| GuardianError::EnvVarMissing {
            name: name.as_str().to_string(),
        })?;
        out.push_str(&value[last..whole.start()]);
        out.push_str(&resolved);
        last = whole.end();
    }
    out.push_str(&value[last..]);
    Ok(out)
}

fn expand_opt<F>(value: Option<&str>, lookup: &F) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    value.map(|v| expand_env_with(v, lookup)).transpose()
}
