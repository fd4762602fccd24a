//! Error types for rate-guardian.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized by how the monitor reacts to them:
//! - **Configuration**: fatal, reported before any target is polled
//! - **Check**: a single cycle of a single target failed; the reading is
//!   treated as unknown and polling continues
//! - **Notification**: a single channel failed to deliver; other channels
//!   and future cycles are unaffected
//! - **Network**: transport level failures surfaced by the HTTP helpers
//! - **Internal**: I/O, serialization and unclassified errors
//!
//! Each error has a stable error code (e.g., `RG-C001`) for programmatic handling.

pub mod suggestions;

use std::time::Duration;
use thiserror::Error;

pub use suggestions::FixSuggestion;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid or incomplete configuration. Fatal at startup.
    Configuration,
    /// A provider check failed for one cycle.
    Check,
    /// A notification channel failed to deliver.
    Notification,
    /// Connection, timeout or DNS issues.
    Network,
    /// Internal errors (bugs, I/O, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration error",
            Self::Check => "Check failure",
            Self::Notification => "Notification failure",
            Self::Network => "Network error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Configuration => "C",
            Self::Check => "P",
            Self::Notification => "N",
            Self::Network => "T",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Configuration could not be loaded or validated
    ConfigError = 2,
    /// One-shot check saw at least one failing target
    CheckFailed = 3,
    /// Test notification failed on at least one channel
    NotifyFailed = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Main error type for rate-guardian operations.
#[derive(Error, Debug)]
pub enum GuardianError {
    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// Configuration file not found at expected path.
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Error parsing configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid { key: String, message: String },

    /// Provider id has no registered checker.
    #[error("unknown provider '{provider}' (registered: {known})")]
    UnknownProvider { provider: String, known: String },

    /// Target has no credential configured.
    #[error("target '{target}' has no api_key configured")]
    MissingCredential { target: String },

    /// Two targets share the same name.
    #[error("duplicate target name '{name}'")]
    DuplicateTarget { name: String },

    /// Configuration lists no targets.
    #[error("no targets configured")]
    NoTargets,

    /// Referenced environment variable is not set.
    #[error("environment variable not set: {name}")]
    EnvVarMissing { name: String },

    // ==========================================================================
    // Check failures (Category: Check)
    // ==========================================================================
    /// Provider rejected the probe because we are rate limited ourselves.
    #[error("rate limited by {provider}: {message}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
        message: String,
    },

    /// Provider API returned a non-success status.
    #[error("provider {provider} API error: {message}")]
    ProviderApiError {
        provider: String,
        status_code: Option<u16>,
        message: String,
    },

    /// Quota information missing from the provider response.
    #[error("missing rate limit data in {provider} response")]
    MissingRateLimit { provider: String },

    /// Failed to parse provider response.
    #[error("failed to parse response: {0}")]
    ParseResponse(String),

    /// A check did not finish within its time budget.
    #[error("check for target '{target}' timed out after {seconds}s")]
    CheckTimeout { target: String, seconds: u64 },

    /// A checker panicked during a cycle.
    #[error("checker for target '{target}' panicked")]
    CheckPanicked { target: String },

    /// A one-shot check could not read usage for some targets.
    #[error("{failed} of {total} targets returned no usage data")]
    ChecksFailed { failed: usize, total: usize },

    // ==========================================================================
    // Notification failures (Category: Notification)
    // ==========================================================================
    /// A channel could not deliver an alert.
    #[error("{channel} notification failed: {reason}")]
    NotificationFailed { channel: String, reason: String },

    /// A test notification failed on some channels.
    #[error("{failed} of {total} notification channels failed")]
    NotificationsFailed { failed: usize, total: usize },

    // ==========================================================================
    // Network errors (Category: Network)
    // ==========================================================================
    /// Request timeout.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// Generic network error.
    #[error("network error: {0}")]
    Network(String),

    // ==========================================================================
    // I/O errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GuardianError {
    /// Map error to process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self.category() {
            ErrorCategory::Configuration => ExitCode::ConfigError,
            ErrorCategory::Check => ExitCode::CheckFailed,
            ErrorCategory::Notification => ExitCode::NotifyFailed,
            ErrorCategory::Network | ErrorCategory::Internal => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::UnknownProvider { .. }
            | Self::MissingCredential { .. }
            | Self::DuplicateTarget { .. }
            | Self::NoTargets
            | Self::EnvVarMissing { .. } => ErrorCategory::Configuration,

            Self::RateLimited { .. }
            | Self::ProviderApiError { .. }
            | Self::MissingRateLimit { .. }
            | Self::ParseResponse(_)
            | Self::CheckTimeout { .. }
            | Self::CheckPanicked { .. }
            | Self::ChecksFailed { .. } => ErrorCategory::Check,

            Self::NotificationFailed { .. } | Self::NotificationsFailed { .. } => {
                ErrorCategory::Notification
            }

            Self::Timeout(_) | Self::Network(_) => ErrorCategory::Network,

            Self::Io(_) | Self::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `RG-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "RG-C001",
            Self::ConfigParse { .. } => "RG-C002",
            Self::ConfigInvalid { .. } => "RG-C003",
            Self::UnknownProvider { .. } => "RG-C010",
            Self::MissingCredential { .. } => "RG-C011",
            Self::DuplicateTarget { .. } => "RG-C012",
            Self::NoTargets => "RG-C013",
            Self::EnvVarMissing { .. } => "RG-C020",

            Self::RateLimited { .. } => "RG-P001",
            Self::ProviderApiError { .. } => "RG-P002",
            Self::MissingRateLimit { .. } => "RG-P003",
            Self::ParseResponse(_) => "RG-P004",
            Self::CheckTimeout { .. } => "RG-P010",
            Self::CheckPanicked { .. } => "RG-P011",
            Self::ChecksFailed { .. } => "RG-P020",

            Self::NotificationFailed { .. } => "RG-N001",
            Self::NotificationsFailed { .. } => "RG-N002",

            Self::Timeout(_) => "RG-T001",
            Self::Network(_) => "RG-T099",

            Self::Io(_) => "RG-X001",
            Self::Json(_) => "RG-X002",
        }
    }

    /// Whether this error must abort startup.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.category(), ErrorCategory::Configuration)
    }

    /// Returns the retry-after duration if this error specifies one.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns actionable fix suggestions for this error.
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            Self::ConfigNotFound { path } => suggestions::config_not_found_suggestions(path),
            Self::ConfigParse { path, message } => {
                suggestions::config_parse_suggestions(path, message)
            }
            Self::ConfigInvalid { key, .. } => suggestions::config_invalid_suggestions(key),
            Self::UnknownProvider { provider, known } => {
                suggestions::unknown_provider_suggestions(provider, known)
            }
            Self::MissingCredential { target } => {
                suggestions::missing_credential_suggestions(target)
            }
            Self::EnvVarMissing { name } => suggestions::env_var_missing_suggestions(name),
            Self::RateLimited { provider, .. } => {
                suggestions::rate_limited_suggestions(provider, self.retry_after())
            }
            Self::ProviderApiError {
                provider,
                status_code,
                ..
            } => suggestions::provider_api_suggestions(provider, *status_code),
            Self::Timeout(seconds) | Self::CheckTimeout { seconds, .. } => {
                suggestions::timeout_suggestions(*seconds)
            }
            _ => Vec::new(),
        }
    }
}

/// Result type alias for rate-guardian operations.
pub type Result<T> = std::result::Result<T, GuardianError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_errors() -> Vec<GuardianError> {
        vec![
            GuardianError::ConfigNotFound {
                path: "/tmp/config.toml".to_string(),
            },
            GuardianError::ConfigParse {
                path: "/tmp/config.toml".to_string(),
                message: "expected '='".to_string(),
            },
            GuardianError::ConfigInvalid {
                key: "targets[0].threshold".to_string(),
                message: "must be in (0, 100]".to_string(),
            },
            GuardianError::UnknownProvider {
                provider: "acme".to_string(),
                known: "openai".to_string(),
            },
            GuardianError::MissingCredential {
                target: "main".to_string(),
            },
            GuardianError::DuplicateTarget {
                name: "main".to_string(),
            },
            GuardianError::NoTargets,
            GuardianError::EnvVarMissing {
                name: "OPENAI_API_KEY".to_string(),
            },
            GuardianError::RateLimited {
                provider: "openai".to_string(),
                retry_after: Some(Duration::from_secs(30)),
                message: "slow down".to_string(),
            },
            GuardianError::ProviderApiError {
                provider: "github".to_string(),
                status_code: Some(401),
                message: "Bad credentials".to_string(),
            },
            GuardianError::MissingRateLimit {
                provider: "minimax".to_string(),
            },
            GuardianError::ParseResponse("eof".to_string()),
            GuardianError::CheckTimeout {
                target: "main".to_string(),
                seconds: 15,
            },
            GuardianError::CheckPanicked {
                target: "main".to_string(),
            },
            GuardianError::ChecksFailed {
                failed: 1,
                total: 2,
            },
            GuardianError::NotificationFailed {
                channel: "telegram".to_string(),
                reason: "HTTP 500".to_string(),
            },
            GuardianError::NotificationsFailed {
                failed: 1,
                total: 3,
            },
            GuardianError::Timeout(10),
            GuardianError::Network("connection reset".to_string()),
            GuardianError::Io(std::io::Error::other("disk")),
        ]
    }

    #[test]
    fn error_codes_follow_format() {
        for err in sample_errors() {
            let code = err.error_code();
            assert!(code.starts_with("RG-"), "bad code {code}");
            let prefix = err.category().code_prefix();
            assert_eq!(&code[3..4], prefix, "code {code} does not match category");
        }
    }

    #[test]
    fn error_codes_are_unique() {
        let codes: Vec<_> = sample_errors().iter().map(GuardianError::error_code).collect();
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len());
    }

    #[test]
    fn only_configuration_errors_are_fatal() {
        for err in sample_errors() {
            assert_eq!(
                err.is_fatal(),
                err.category() == ErrorCategory::Configuration,
                "{err}"
            );
        }
    }

    #[test]
    fn exit_codes_are_correct() {
        assert_eq!(GuardianError::NoTargets.exit_code(), ExitCode::ConfigError);
        assert_eq!(
            GuardianError::ParseResponse(String::new()).exit_code(),
            ExitCode::CheckFailed
        );
        assert_eq!(
            GuardianError::NotificationFailed {
                channel: "bark".to_string(),
                reason: String::new(),
            }
            .exit_code(),
            ExitCode::NotifyFailed
        );
        assert_eq!(
            GuardianError::Network(String::new()).exit_code(),
            ExitCode::GeneralError
        );
        assert_eq!(i32::from(ExitCode::ConfigError), 2);
    }

    #[test]
    fn unknown_provider_names_identifier() {
        let err = GuardianError::UnknownProvider {
            provider: "acme".to_string(),
            known: "anthropic, github".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("acme"));
        assert!(msg.contains("anthropic, github"));
    }

    #[test]
    fn retry_after_only_for_rate_limits() {
        let limited = GuardianError::RateLimited {
            provider: "openai".to_string(),
            retry_after: Some(Duration::from_secs(5)),
            message: String::new(),
        };
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(5)));
        assert_eq!(GuardianError::Timeout(3).retry_after(), None);
    }

    #[test]
    fn configuration_errors_have_suggestions() {
        for err in sample_errors()
            .into_iter()
            .filter(|e| e.category() == ErrorCategory::Configuration)
            .filter(|e| {
                !matches!(
                    e,
                    GuardianError::DuplicateTarget { .. }
                        | GuardianError::NoTargets
                )
            })
        {
            assert!(!err.fix_suggestions().is_empty(), "no suggestion for {err}");
        }
    }
}
