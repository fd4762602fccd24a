//! Test utilities for rate-guardian.
//!
//! Provides scripted checkers, recording notifiers, data factories and
//! assertion macros shared by unit and integration tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rate_guardian::test_utils::*;
//!
//! let checker = ScriptedChecker::new("openai", vec![Some(70.0), Some(85.0)]);
//! let recorder = RecordingNotifier::new("recorder");
//! let dir = TestDir::new();
//! dir.create_file("config.toml", &make_test_config_toml());
//! ```

use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::core::checker::Checker;
use crate::core::credential::Credential;
use crate::core::dispatch::{Notifier, NotifyOutcome};
use crate::core::models::{Alert, Target, UsageReport};

// =============================================================================
// Test Data Factories
// =============================================================================

/// Create a test `Target` polling the `openai` checker.
#[must_use]
pub fn make_test_target(name: &str, threshold_percent: f64, check_interval: Duration) -> Target {
    Target {
        name: name.to_string(),
        provider: "openai".to_string(),
        threshold_percent,
        check_interval,
        credential: Credential::new("sk-test-key"),
        base_url: None,
        organization: None,
    }
}

/// Create a `UsageReport` with an exact usage percentage, or an unknown
/// reading when `usage_percent` is `None`.
///
/// Known readings are scaled against a limit of 1000 requests.
#[must_use]
pub fn make_test_report(provider: &str, usage_percent: Option<f64>) -> UsageReport {
    match usage_percent {
        Some(percent) => UsageReport {
            provider: provider.to_string(),
            usage_percent: Some(percent),
            raw_used: Some(percent * 10.0),
            raw_limit: Some(1000.0),
            remaining: Some(1000.0 - percent * 10.0),
            reset: None,
            timestamp: Utc::now(),
            provider_error: None,
        },
        None => UsageReport::failure(provider, "scripted failure"),
    }
}

/// Sample config TOML with one target and the console channel.
#[must_use]
pub fn make_test_config_toml() -> String {
    r#"[general]
timeout_seconds = 10

[monitor]
hysteresis_margin = 5.0

[[targets]]
name = "primary"
provider = "openai"
api_key = "sk-test-key"
threshold = 80
check_interval = 60

[notifications.console]
enabled = true
"#
    .to_string()
}

// =============================================================================
// Fake Checkers
// =============================================================================

/// A checker that replays a fixed sequence of readings.
///
/// After the script runs out the last reading repeats. Counts calls and the
/// number of concurrently running checks so tests can assert scheduling.
pub struct ScriptedChecker {
    provider: String,
    readings: Vec<Option<f64>>,
    delay: Option<Duration>,
    panics: bool,
    calls: AtomicUsize,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedChecker {
    #[must_use]
    pub fn new(provider: &str, readings: Vec<Option<f64>>) -> Self {
        Self {
            provider: provider.to_string(),
            readings,
            delay: None,
            panics: false,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` inside every check.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Panic inside every check.
    #[must_use]
    pub const fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    /// Checks started.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Checks that ran to completion.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Highest number of checks observed running at once.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Checker for ScriptedChecker {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn check(&self) -> UsageReport {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        assert!(!self.panics, "scripted checker panic");

        let reading = self
            .readings
            .get(index)
            .or_else(|| self.readings.last())
            .copied()
            .flatten();
        self.completed.fetch_add(1, Ordering::SeqCst);
        make_test_report(&self.provider, reading)
    }
}

// =============================================================================
// Fake Notifiers
// =============================================================================

/// A notifier that records every alert it receives.
pub struct RecordingNotifier {
    name: String,
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// Alerts received so far, in delivery order.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().expect("recorder lock poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn notify(&self, alert: &Alert) -> NotifyOutcome {
        self.alerts
            .lock()
            .expect("recorder lock poisoned")
            .push(alert.clone());
        NotifyOutcome::Delivered
    }
}

/// A notifier that always fails, or panics.
pub struct FailingNotifier {
    name: String,
    panics: bool,
}

impl FailingNotifier {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            panics: false,
        }
    }

    #[must_use]
    pub fn panicking(name: &str) -> Self {
        Self {
            name: name.to_string(),
            panics: true,
        }
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn notify(&self, _alert: &Alert) -> NotifyOutcome {
        assert!(!self.panics, "failing notifier panic");
        NotifyOutcome::Failed("channel unavailable".to_string())
    }
}

// =============================================================================
// Temp Directory Utilities
// =============================================================================

/// A temporary directory for tests with automatic cleanup.
///
/// Creates an isolated directory that is automatically deleted when
/// the `TestDir` is dropped. Uses the `tempfile` crate internally.
///
/// # Examples
///
/// ```rust,ignore
/// use rate_guardian::test_utils::TestDir;
///
/// let dir = TestDir::new();
/// dir.create_file("config.toml", "[general]\ntimeout_seconds = 30");
///
/// let config_path = dir.path().join("config.toml");
/// assert!(config_path.exists());
///
/// // Directory is automatically cleaned up when `dir` goes out of scope
/// ```
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Create a file in the temporary directory with the given content.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.inner.path().join(name);

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
    }

    /// Get the full path to a file in the temporary directory.
    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string contains a substring.
///
/// # Examples
///
/// ```rust,ignore
/// use rate_guardian::assert_contains;
///
/// let text = "Hello, world!";
/// assert_contains!(text, "world");
/// ```
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected string to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
    ($haystack:expr, $needle:expr, $($arg:tt)*) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            $($arg)*
        );
    };
}

/// Assert that a string is valid JSON.
///
/// # Examples
///
/// ```rust,ignore
/// use rate_guardian::assert_json_valid;
///
/// let json = r#"{"key": "value"}"#;
/// assert_json_valid!(json);
/// ```
#[macro_export]
macro_rules! assert_json_valid {
    ($json:expr) => {
        let json = $json;
        match serde_json::from_str::<serde_json::Value>(json) {
            Ok(_) => {}
            Err(e) => {
                panic!(
                    "Expected valid JSON, but parsing failed: {}\n\nJSON string:\n{}",
                    e, json
                );
            }
        }
    };
}

/// Assert that a string does NOT contain ANSI escape codes.
///
/// # Examples
///
/// ```rust,ignore
/// use rate_guardian::assert_no_ansi_codes;
///
/// let plain = "plain text";
/// assert_no_ansi_codes!(plain);
/// ```
#[macro_export]
macro_rules! assert_no_ansi_codes {
    ($text:expr) => {
        let text = $text;
        assert!(
            !text.contains('\x1b') && !text.contains('\u{001b}'),
            "Expected string to NOT contain ANSI escape codes.\n\nActual string:\n{:?}",
            text
        );
    };
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Strip ANSI escape codes from a string.
///
/// Useful for comparing output content without formatting.
#[must_use]
pub fn strip_ansi_codes(text: &str) -> String {
    // Simple regex-free ANSI stripping
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip the escape sequence
            if chars.peek() == Some(&'[') {
                chars.next(); // consume '['
                // Skip until we hit a letter (the terminator)
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_checker_repeats_last_reading() {
        let checker = ScriptedChecker::new("openai", vec![Some(10.0), None]);
        assert_eq!(checker.check().await.usage_percent, Some(10.0));
        assert!(checker.check().await.is_unknown());
        assert!(checker.check().await.is_unknown());
        assert_eq!(checker.calls(), 3);
        assert_eq!(checker.completed(), 3);
        assert_eq!(checker.max_in_flight(), 1);
    }

    #[test]
    fn test_report_factory_is_exact() {
        let report = make_test_report("github", Some(82.0));
        assert_eq!(report.usage_percent, Some(82.0));
        assert_eq!(report.raw_used, Some(820.0));
        assert!(make_test_report("github", None).provider_error.is_some());
    }

    #[tokio::test]
    async fn recording_notifier_keeps_order() {
        let recorder = RecordingNotifier::new("rec");
        let mut alert = Alert::test_alert();
        recorder.notify(&alert).await;
        alert.title = "second".to_string();
        recorder.notify(&alert).await;

        let titles: Vec<_> = recorder.alerts().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["Test notification", "second"]);
    }

    #[test]
    fn test_dir_creates_and_cleans_up() {
        let path: PathBuf;
        {
            let dir = TestDir::new();
            path = dir.path().to_path_buf();
            assert!(path.exists());
            dir.create_file("test.txt", "hello");
            assert!(path.join("test.txt").exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_dir_creates_nested_files() {
        let dir = TestDir::new();
        dir.create_file("subdir/nested/file.txt", "nested content");
        let path = dir.file_path("subdir/nested/file.txt");
        assert_eq!(fs::read_to_string(path).unwrap(), "nested content");
    }

    #[test]
    fn strip_ansi_removes_escape_sequences() {
        let colored = "\x1b[31mred\x1b[0m text";
        assert_eq!(strip_ansi_codes(colored), "red text");
    }

    #[test]
    fn assertion_macros_work() {
        assert_contains!("Hello, world!", "world");
        assert_json_valid!(r#"{"key": "value"}"#);
        assert_no_ansi_codes!("plain text");
    }
}
