//! Error rendering.
//!
//! Human mode prints the message with its code and the first few fix
//! suggestions. JSON mode emits a structured object for scripts.

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::GuardianError;

/// Render an error for stderr.
#[must_use]
pub fn render_error(error: &GuardianError, format: OutputFormat, no_color: bool, pretty: bool) -> String {
    match format {
        OutputFormat::Json => render_error_json(error, pretty),
        OutputFormat::Human => render_human(error, no_color),
    }
}

fn render_human(error: &GuardianError, no_color: bool) -> String {
    let mut lines = Vec::new();

    let header = format!("Error [{}]: {error}", error.error_code());
    lines.push(if no_color {
        header
    } else {
        header.red().bold().to_string()
    });

    let suggestions = error.fix_suggestions();
    let commands: Vec<&str> = suggestions
        .iter()
        .flat_map(|s| s.commands.iter())
        .map(String::as_str)
        .filter(|cmd| !cmd.starts_with('#'))
        .collect();
    if !commands.is_empty() {
        lines.push(String::new());
        lines.push("How to fix:".to_string());
        for (i, cmd) in commands.iter().enumerate() {
            let cmd = if no_color {
                (*cmd).to_string()
            } else {
                cmd.cyan().to_string()
            };
            lines.push(format!("  {}. {cmd}", i + 1));
        }
    }

    if let Some(context) = suggestions.first().map(|s| s.context.as_str()).filter(|c| !c.is_empty()) {
        lines.push(String::new());
        lines.push(format!("Why: {context}"));
    }

    if let Some(url) = suggestions.first().and_then(|s| s.doc_url.as_deref()) {
        lines.push(format!("Docs: {url}"));
    }

    lines.join("\n")
}

/// Render error as structured JSON for machine consumption.
#[must_use]
pub fn render_error_json(error: &GuardianError, pretty: bool) -> String {
    let error_json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&error_json)
    } else {
        serde_json::to_string(&error_json)
    };
    rendered.unwrap_or_else(|_| format!("Error [{}]: {error}", error.error_code()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorJson {
    error_code: &'static str,
    category: String,
    message: String,
    fatal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_seconds: Option<u64>,
    suggestions: Vec<SuggestionJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionJson {
    commands: Vec<String>,
    context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prevention: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_url: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &GuardianError) -> Self {
        Self {
            error_code: error.error_code(),
            category: error.category().to_string(),
            message: error.to_string(),
            fatal: error.is_fatal(),
            retry_after_seconds: error.retry_after().map(|d| d.as_secs()),
            suggestions: error
                .fix_suggestions()
                .into_iter()
                .map(|s| SuggestionJson {
                    commands: s.commands,
                    context: s.context,
                    prevention: s.prevention,
                    doc_url: s.doc_url,
                })
                .collect(),
        }
    }
}
