//! Robot-mode output.
//!
//! Every JSON document is wrapped in a small versioned envelope so scripts can
//! check `schemaVersion` before reading `data`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

pub const SCHEMA_VERSION: &str = "rate-guardian.v1";

/// Envelope around one command's output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,
}

impl<T> RobotOutput<T> {
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            command: command.into(),
            data,
        }
    }
}

/// Render any serializable value as JSON.
///
/// # Errors
///
/// Propagates serialization failures.
pub fn render_json<T: Serialize>(output: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(json)
}

/// Wrap `data` in a [`RobotOutput`] and render it.
///
/// # Errors
///
/// Propagates serialization failures.
pub fn render_envelope<T: Serialize>(command: &str, data: T, pretty: bool) -> Result<String> {
    render_json(&RobotOutput::new(command, data), pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_json_valid;

    #[test]
    fn envelope_fields() {
        let json = render_envelope("check", vec![1, 2], false).unwrap();
        assert_json_valid!(&json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(value["command"], "check");
        assert_eq!(value["data"][1], 2);
    }

    #[test]
    fn pretty_is_multiline() {
        let json = render_envelope("validate", serde_json::json!({"a": 1}), true).unwrap();
        assert!(json.contains('\n'));
    }
}
