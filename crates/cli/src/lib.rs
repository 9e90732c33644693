// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hsrs - Command-line front end for histsync.
//!
//! This crate provides the `histsync` CLI on top of [`hs_core`]: one-shot
//! sync and clear, daemon lifecycle management, and configuration
//! inspection.
//!
//! ```rust,ignore
//! use clap::Parser;
//! use hsrs::Cli;
//!
//! let cli = Cli::parse_from(["histsync", "sync"]);
//! hsrs::run(cli)?;
//! ```

mod cli;
pub mod colors;
mod commands;
mod daemon;
mod env;
pub mod help;

pub mod config;
pub mod error;

pub use cli::{Cli, Command, ConfigCommand, DaemonCommand};
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

/// Execute a parsed command line. This is the main entry point for library
/// users and provides a testable way to run commands without process
/// execution.
pub fn run(cli: Cli) -> Result<()> {
    let config_path = config::resolve_path(cli.config);
    match cli.command {
        Command::Sync => commands::sync::run(&config_path),
        Command::Clear => commands::clear::run(&config_path),
        Command::Daemon(cmd) => match cmd {
            DaemonCommand::Start { foreground } => commands::daemon::start(&config_path, foreground),
            DaemonCommand::Stop => commands::daemon::stop(&config_path),
            DaemonCommand::Restart => commands::daemon::restart(&config_path),
            DaemonCommand::Status => commands::daemon::status(&config_path),
            DaemonCommand::Logs { follow } => commands::daemon::logs(&config_path, follow),
        },
        Command::Config(cmd) => commands::config::run(cmd, &config_path),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "histsync", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Installs the stderr logger used by one-shot commands.
///
/// `RUST_LOG` overrides the level chosen by `verbose`.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(env::vars::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
