// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::colors;
use crate::help;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "histsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Keep shell history in sync across machines")]
#[command(
    long_about = "Keep shell history in sync across machines.\n\n\
    Merges the local history file with a shared copy kept in a git repository \
    or on a remote host over ssh, either on demand or from a background daemon."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
pub struct Cli {
    /// Configuration file (default: ~/.config/histsync/config.toml)
    #[arg(short = 'c', long = "config", global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge the local history with the shared history once
    #[command(after_help = colors::examples("\
Examples:
  histsync sync                         Sync with the configured store
  histsync -c ~/alt.toml sync           Sync using another config file"))]
    Sync,

    /// Empty the shared history
    ///
    /// With the git store this force-pushes an empty history file, which
    /// discards anything another machine pushed since the last fetch. With
    /// the ssh store it refuses to run while another host holds the lock.
    /// The local history file is not touched.
    Clear,

    /// Manage the background sync daemon
    #[command(subcommand)]
    Daemon(DaemonCommand),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    #[command(after_help = colors::examples("\
Examples:
  histsync completion zsh > ~/.zfunc/_histsync     Install zsh completions
  histsync completion bash >> ~/.bashrc           Append bash completions"))]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Daemon management commands.
#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon
    Start {
        /// Run in foreground (for debugging)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon
    Stop,
    /// Stop the daemon if it is running, then start it
    Restart,
    /// Show daemon status
    Status,
    /// View daemon logs
    Logs {
        /// Follow log output (tail -f)
        #[arg(long, short)]
        follow: bool,
    },
}

/// Configuration commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
