//! `itemlist` command-line entry point.
//!
//! # Responsibility
//! - Parse flags, open the configured store and load it.
//! - Dispatch one subcommand and map failures to a non-zero exit code.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use itemlist_core::{default_log_level, init_logging, open_record_store};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: {err}");
        }
    }

    if matches!(cli.command, Commands::Version) {
        commands::print_version();
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = cli.store.to_config()?;
    let mut store = open_record_store(&config).map_err(|err| err.to_string())?;
    store.load();
    commands::run(cli.command, store.as_mut())
}
