//! rate-guardian - API Rate Guardian
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use rate_guardian::cli::{Cli, Commands};
use rate_guardian::core::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_settings =
        logging::LogSettings::from_cli(cli.log_level.as_deref(), cli.json_output, cli.verbose);
    logging::init(&log_settings);

    let format = cli.effective_format();
    let pretty = cli.pretty;
    let no_color = !rate_guardian::util::env::should_use_color(cli.no_color);
    if no_color {
        colored::control::set_override(false);
    }

    match run(cli, no_color).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error_code = e.error_code(), "{e}");
            let error_output =
                rate_guardian::render::error::render_error(&e, format, no_color, pretty);
            eprintln!("{error_output}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli, no_color: bool) -> rate_guardian::Result<()> {
    let format = cli.effective_format();
    let pretty = cli.pretty;
    let config = cli.config.as_deref();

    match cli.command {
        None => {
            print_quickstart();
            Ok(())
        }

        Some(Commands::Run) => rate_guardian::cli::run::execute(config).await,

        Some(Commands::Check(args)) => {
            rate_guardian::cli::check::execute(&args, config, format, pretty, no_color).await
        }

        Some(Commands::Validate) => {
            rate_guardian::cli::validate::execute(config, format, pretty, no_color)
        }

        Some(Commands::TestNotify) => {
            rate_guardian::cli::notify::execute(config, format, pretty, no_color).await
        }
    }
}

/// Print quickstart help when no command is given.
fn print_quickstart() {
    println!(
        r#"rate-guardian - API Rate Guardian

Watch provider quotas (OpenAI, Anthropic, DeepSeek, MiniMax, GitHub) and
alert before you hit the limit.

USAGE:
    rate-guardian [OPTIONS] <COMMAND>

COMMANDS:
    run            Start the monitor loop until Ctrl+C / SIGTERM
    check          Poll every target once and print the readings
    validate       Load and validate the configuration
    test-notify    Send a test alert through every enabled channel

QUICK START:
    rate-guardian validate                    # Check config.toml
    rate-guardian test-notify                 # Verify your channels
    rate-guardian check --target openai-main  # One-off reading
    rate-guardian run                         # Start monitoring

ROBOT MODE:
    rate-guardian check --json                # JSON output

Config: --config PATH, $GUARDIAN_CONFIG, or the platform config dir.
For more help: rate-guardian --help
"#
    );

    println!("Version: {}", env!("CARGO_PKG_VERSION"));
}
