//! `check`: poll targets once and print the readings.

use std::path::Path;

use futures::future::join_all;

use crate::cli::args::{CheckArgs, OutputFormat};
use crate::cli::load_config;
use crate::core::checker::{CheckerRegistry, guarded_check};
use crate::core::models::Target;
use crate::core::monitor::MonitoredTarget;
use crate::error::{GuardianError, Result};
use crate::render::{self, CheckRow, CheckStatus};

/// Execute the check command.
///
/// # Errors
///
/// Configuration errors, or `ChecksFailed` when any target returned no usage.
pub async fn execute(
    args: &CheckArgs,
    config_path: Option<&Path>,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<()> {
    let loaded = load_config(config_path)?;
    let resolved = loaded.resolved;

    let targets = select_targets(resolved.targets, args.target.as_deref())?;
    let monitored = MonitoredTarget::resolve_all(
        targets,
        CheckerRegistry::builtin(),
        resolved.http_timeout,
    )?;

    let check_timeout = resolved.settings.check_timeout;
    let rows = join_all(monitored.iter().map(|entry| async move {
        let report = guarded_check(entry.checker.as_ref(), &entry.target.name, check_timeout).await;
        CheckRow::new(&entry.target, report)
    }))
    .await;

    println!("{}", render::render_check(&rows, format, pretty, no_color)?);

    let failed = rows
        .iter()
        .filter(|row| row.status == CheckStatus::Unknown)
        .count();
    if failed > 0 {
        return Err(GuardianError::ChecksFailed {
            failed,
            total: rows.len(),
        });
    }
    Ok(())
}

/// Keep only the target named `only`, or all targets.
///
/// # Errors
///
/// `ConfigInvalid` when no target has that name.
pub fn select_targets(targets: Vec<Target>, only: Option<&str>) -> Result<Vec<Target>> {
    let Some(name) = only else {
        return Ok(targets);
    };

    let known: Vec<String> = targets.iter().map(|t| t.name.clone()).collect();
    let selected: Vec<Target> = targets.into_iter().filter(|t| t.name == name).collect();
    if selected.is_empty() {
        return Err(GuardianError::ConfigInvalid {
            key: "--target".to_string(),
            message: format!("no target named '{name}' (configured: {})", known.join(", ")),
        });
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_test_target;
    use std::time::Duration;

    fn targets() -> Vec<Target> {
        vec![
            make_test_target("a", 80.0, Duration::from_secs(60)),
            make_test_target("b", 80.0, Duration::from_secs(60)),
        ]
    }

    #[test]
    fn select_all_without_filter() {
        assert_eq!(select_targets(targets(), None).unwrap().len(), 2);
    }

    #[test]
    fn select_by_name() {
        let selected = select_targets(targets(), Some("b")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "b");
    }

    #[test]
    fn unknown_name_is_config_error() {
        let err = select_targets(targets(), Some("zzz")).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("configured: a, b"));
    }
}
