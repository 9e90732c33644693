// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! histsyncd - The histsync daemon.
//!
//! Periodically reconciles the local shell history with the configured
//! shared store until it receives SIGTERM or SIGINT.
//!
//! Usage:
//!   histsyncd [--config <path>]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use hs_core::{install_signal_handlers, Config, Controller};

mod env;

fn main() {
    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let config_path = parse_config_path(&args);

    let config = match Config::load_or_create(&config_path) {
        Ok(config) => config,
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    };

    setup_logging(&config.log_file_path());
    tracing::info!(
        "histsyncd starting, config={}, sync_type={}",
        config_path.display(),
        config.settings.sync_type
    );

    let shutdown = match install_signal_handlers() {
        Ok(flag) => flag,
        Err(e) => {
            tracing::error!("failed to install signal handlers: {}", e);
            report(&e);
            std::process::exit(1);
        }
    };

    let mut controller = Controller::new(config, shutdown);
    let result = controller.run(|| {
        // Signal readiness to parent process
        println!("READY");
        let _ = std::io::stdout().flush();
    });

    if let Err(e) = result {
        tracing::error!("histsyncd failed: {}", e);
        report(&e);
        std::process::exit(1);
    }
    tracing::info!("histsyncd stopped");
}

/// Prints a fatal error for the parent process, which may have gone away.
fn report(e: &dyn std::fmt::Display) {
    let _ = writeln!(std::io::stderr(), "histsyncd: {e}");
}

fn parse_config_path(args: &[String]) -> PathBuf {
    for i in 0..args.len() {
        if args[i] == "--config" {
            if let Some(path) = args.get(i + 1) {
                return PathBuf::from(path);
            }
        }
    }
    env::config_path().unwrap_or_else(hs_core::config::default_config_path)
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_env(env::names::RUST_LOG).unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
