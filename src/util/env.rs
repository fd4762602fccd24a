//! Terminal color detection.

use std::io::IsTerminal;

/// Whether human output on stdout should be colored.
///
/// `--no-color`, `NO_COLOR` (any value) and `TERM=dumb` all disable color,
/// as does a stdout that is not a terminal.
#[must_use]
pub fn should_use_color(no_color_flag: bool) -> bool {
    color_allowed(no_color_flag, |key| std::env::var(key).ok()) && std::io::stdout().is_terminal()
}

fn color_allowed(no_color_flag: bool, env: impl Fn(&str) -> Option<String>) -> bool {
    !no_color_flag && env("NO_COLOR").is_none() && env("TERM").as_deref() != Some("dumb")
}
