//! Fix suggestion database for rate-guardian errors.
//!
//! Provides actionable fix suggestions mapped to specific error types,
//! including commands, context explanations, and prevention tips.

use std::time::Duration;

use crate::core::provider::Provider;

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Primary fix commands in order of preference.
    /// These should be copy-paste ready for the terminal.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,

    /// Link to documentation for more information.
    pub doc_url: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
            doc_url: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }

    /// Builder: adds documentation URL.
    #[must_use]
    pub fn with_doc_url(mut self, url: impl Into<String>) -> Self {
        self.doc_url = Some(url.into());
        self
    }
}

// =============================================================================
// Suggestion Generators
// =============================================================================

/// Generates fix suggestions for config not found errors.
#[must_use]
pub fn config_not_found_suggestions(path: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![
            format!("$EDITOR {path}"),
            "rate-guardian --config /path/to/config.toml validate".to_string(),
        ],
        format!(
            "Configuration file not found at {path}. The monitor needs at least one \
             [[targets]] entry to know which APIs to watch."
        ),
    )]
}

/// Generates fix suggestions for config parse errors.
#[must_use]
pub fn config_parse_suggestions(path: &str, message: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("$EDITOR {path}"), "rate-guardian validate".to_string()],
            format!("The config file has a syntax error. The TOML parser reported: {message}"),
        )
        .with_prevention("Run `rate-guardian validate` after every edit."),
    ]
}

/// Generates fix suggestions for invalid config value errors.
#[must_use]
pub fn config_invalid_suggestions(key: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["rate-guardian validate".to_string()],
        format!("Fix the value of '{key}' in your config file and validate again."),
    )]
}

/// Generates fix suggestions for unknown provider errors.
#[must_use]
pub fn unknown_provider_suggestions(provider: &str, known: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("# Use one of: {known}")],
        format!("No checker is registered for provider '{provider}'."),
    )]
}

/// Generates fix suggestions for a target without a credential.
#[must_use]
pub fn missing_credential_suggestions(target: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![
                "# In the [[targets]] entry:".to_string(),
                "api_key = \"${MY_API_KEY}\"".to_string(),
            ],
            format!("Target '{target}' needs an api_key to query its provider."),
        )
        .with_prevention(
            "Reference keys through ${VAR} placeholders instead of writing secrets \
             into the config file.",
        ),
    ]
}

/// Generates fix suggestions for missing environment variable errors.
#[must_use]
pub fn env_var_missing_suggestions(name: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![
            format!("export {name}=\"your_value_here\""),
            format!("# Or add to ~/.bashrc: export {name}=\"...\""),
        ],
        format!("The config references ${{{name}}} but the variable is not set."),
    )]
}

/// Generates fix suggestions for rate limit errors.
#[must_use]
pub fn rate_limited_suggestions(provider: &str, retry_after: Option<Duration>) -> Vec<FixSuggestion> {
    let wait_info = retry_after.map_or_else(
        || "Wait before retrying.".to_string(),
        |d| format!("Try again in {} seconds.", d.as_secs()),
    );

    vec![
        FixSuggestion::new(
            vec!["# Increase check_interval for this target".to_string()],
            format!("The probe request to {provider} was itself rate limited. {wait_info}"),
        )
        .with_prevention("Each check spends one request; poll less often on tight quotas."),
    ]
}

/// Generates fix suggestions for provider API errors.
#[must_use]
pub fn provider_api_suggestions(provider: &str, status_code: Option<u16>) -> Vec<FixSuggestion> {
    let mut suggestion = match status_code {
        Some(401 | 403) => FixSuggestion::new(
            vec![format!("# Rotate the api_key configured for {provider}")],
            format!("{provider} rejected the credential."),
        ),
        Some(code) => FixSuggestion::new(
            vec!["rate-guardian check".to_string()],
            format!("{provider} answered with HTTP {code}."),
        ),
        None => FixSuggestion::new(
            vec!["rate-guardian check".to_string()],
            format!("{provider} returned an unexpected response."),
        ),
    };

    if let Ok(known) = Provider::from_cli_name(provider) {
        suggestion = suggestion.with_doc_url(known.docs_url());
    }

    vec![suggestion]
}

/// Generates fix suggestions for timeout errors.
#[must_use]
pub fn timeout_suggestions(seconds: u64) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec!["# Raise [general] timeout_seconds in the config".to_string()],
            format!("The provider did not respond within {seconds}s."),
        )
        .with_prevention("Check network connectivity from the monitoring host."),
    ]
}
