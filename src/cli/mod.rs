//! CLI argument parsing and command dispatch.

pub mod args;
pub mod check;
pub mod notify;
pub mod run;
pub mod validate;

use std::path::{Path, PathBuf};

use crate::core::checker::CheckerRegistry;
use crate::error::Result;
use crate::storage::{Config, ResolvedConfig};

pub use args::{CheckArgs, Cli, Commands, OutputFormat};

/// A config file loaded and resolved against the built-in checkers.
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: Config,
    pub resolved: ResolvedConfig,
}

/// Locate, parse, validate and resolve the configuration.
///
/// # Errors
///
/// Any configuration error; all of them are fatal.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = Config::resolve_path(explicit);
    let config = Config::load_from(&path)?;
    let resolved = config.resolve(CheckerRegistry::builtin())?;
    tracing::debug!(
        path = %path.display(),
        targets = resolved.targets.len(),
        "configuration resolved"
    );
    Ok(LoadedConfig {
        path,
        config,
        resolved,
    })
}
