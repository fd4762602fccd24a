//! Logging setup for the monitor and one-shot commands.
//!
//! Logs go to stderr (or `GUARDIAN_LOG_FILE`) so that `check --json` output on
//! stdout stays machine readable. `RUST_LOG` replaces the level filter.
//!
//! Every target task runs inside a [`target_span`], so each cycle event picks
//! up `target_name` and `provider` without repeating them.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing::{Level, Span};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::core::models::Target;

const LOG_LEVEL_ENV: &str = "GUARDIAN_LOG";
const LOG_FORMAT_ENV: &str = "GUARDIAN_LOG_FORMAT";
const LOG_FILE_ENV: &str = "GUARDIAN_LOG_FILE";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event, with the enclosing target span flattened in.
    Json,
    Compact,
}

impl LogFormat {
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Parse a level name as accepted by `--log-level` and `GUARDIAN_LOG`.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" | "verbose" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: Level,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Human,
            file: None,
        }
    }
}

impl LogSettings {
    /// Combine CLI flags with the `GUARDIAN_LOG*` environment.
    ///
    /// Level: `--log-level`, then `GUARDIAN_LOG`, then info. `--verbose`
    /// raises anything quieter than debug to debug. Format: `--json-output`,
    /// then `GUARDIAN_LOG_FORMAT`, then human.
    #[must_use]
    pub fn from_cli(flag_level: Option<&str>, json_output: bool, verbose: bool) -> Self {
        Self::resolve(flag_level, json_output, verbose, |key| std::env::var(key).ok())
    }

    fn resolve(
        flag_level: Option<&str>,
        json_output: bool,
        verbose: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let mut level = flag_level
            .and_then(parse_level)
            .or_else(|| env(LOG_LEVEL_ENV).as_deref().and_then(parse_level))
            .unwrap_or(Level::INFO);
        if verbose && level < Level::DEBUG {
            level = Level::DEBUG;
        }

        let format = if json_output {
            LogFormat::Json
        } else {
            env(LOG_FORMAT_ENV)
                .as_deref()
                .and_then(LogFormat::from_arg)
                .unwrap_or_default()
        };

        Self {
            level,
            format,
            file: env(LOG_FILE_ENV).map(|path| PathBuf::from(path.trim())),
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    #[must_use]
    pub fn directive(&self) -> String {
        format!("rate_guardian={}", self.level.as_str().to_lowercase())
    }
}

/// Span wrapping every cycle of one target's task.
#[must_use]
pub fn target_span(target: &Target) -> Span {
    tracing::info_span!(
        "target",
        target_name = %target.name,
        provider = %target.provider,
    )
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(settings: &LogSettings) {
    let writer = settings
        .file
        .as_ref()
        .and_then(|path| OpenOptions::new().create(true).append(true).open(path).ok())
        .map_or_else(|| BoxMakeWriter::new(std::io::stderr), BoxMakeWriter::new);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    let _ = match settings.format {
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
        LogFormat::Compact => builder.compact().with_target(false).try_init(),
        LogFormat::Human => builder.with_target(false).without_time().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn resolve_with(
        vars: &[(&str, &str)],
        flag: Option<&str>,
        json_output: bool,
        verbose: bool,
    ) -> LogSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        LogSettings::resolve(flag, json_output, verbose, |key| vars.get(key).cloned())
    }

    #[test]
    fn flag_beats_env_level() {
        let settings = resolve_with(&[(LOG_LEVEL_ENV, "trace")], Some("warn"), false, false);
        assert_eq!(settings.level, Level::WARN);

        let settings = resolve_with(&[(LOG_LEVEL_ENV, "trace")], None, false, false);
        assert_eq!(settings.level, Level::TRACE);
    }

    #[test]
    fn blank_or_unknown_env_falls_back_to_info() {
        assert_eq!(resolve_with(&[(LOG_LEVEL_ENV, "   ")], None, false, false).level, Level::INFO);
        assert_eq!(resolve_with(&[(LOG_LEVEL_ENV, "loud")], None, false, false).level, Level::INFO);
    }

    #[test]
    fn verbose_raises_but_never_lowers() {
        assert_eq!(resolve_with(&[], Some("error"), false, true).level, Level::DEBUG);
        assert_eq!(resolve_with(&[], Some("trace"), false, true).level, Level::TRACE);
    }

    #[test]
    fn json_output_flag_overrides_env_format() {
        let vars = [(LOG_FORMAT_ENV, "compact")];
        assert_eq!(resolve_with(&vars, None, false, false).format, LogFormat::Compact);
        assert_eq!(resolve_with(&vars, None, true, false).format, LogFormat::Json);
        assert_eq!(
            resolve_with(&[(LOG_FORMAT_ENV, "fancy")], None, false, false).format,
            LogFormat::Human
        );
    }

    #[test]
    fn log_file_from_env() {
        let settings = resolve_with(&[(LOG_FILE_ENV, " /tmp/guardian.log ")], None, false, false);
        assert_eq!(settings.file, Some(PathBuf::from("/tmp/guardian.log")));
        assert_eq!(resolve_with(&[], None, false, false).file, None);
    }

    #[test]
    fn directive_names_crate() {
        let settings = LogSettings {
            level: Level::DEBUG,
            ..LogSettings::default()
        };
        assert_eq!(settings.directive(), "rate_guardian=debug");
    }

    #[test]
    #[tracing_test::traced_test]
    fn target_span_fields_reach_events() {
        let target = crate::test_utils::make_test_target("primary", 80.0, Duration::from_secs(60));
        target_span(&target).in_scope(|| tracing::info!("usage checked"));
        assert!(logs_contain("target_name=primary"));
        assert!(logs_contain("provider=openai"));
    }
}
