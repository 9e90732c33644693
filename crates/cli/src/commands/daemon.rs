// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon management commands.
//!
//! Commands for controlling the histsyncd process that keeps the local
//! history in sync in the background.

use std::io::Write;
use std::path::Path;

use hs_core::{install_signal_handlers, Controller};

use crate::config;
use crate::daemon;
use crate::error::{Error, Result};

/// Show daemon status.
pub fn status(config_path: &Path) -> Result<()> {
    let config = config::load(config_path)?;

    match daemon::detect_daemon(&config.pid_file_path()) {
        Some(info) => {
            println!("Status: running");
            println!("PID: {}", info.pid);
        }
        None => println!("Status: not running"),
    }
    println!("Sync type: {}", config.settings.sync_type);
    println!("Interval: {}s", config.settings.sync_interval_seconds);
    Ok(())
}

/// Stop the daemon.
pub fn stop(config_path: &Path) -> Result<()> {
    let config = config::load(config_path)?;

    match daemon::stop_daemon(&config.pid_file_path()) {
        Ok(pid) => println!("Daemon stopped (PID: {})", pid),
        Err(Error::DaemonNotRunning) => println!("Daemon is not running."),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Start the daemon.
pub fn start(config_path: &Path, foreground: bool) -> Result<()> {
    let config = config::load(config_path)?;

    if foreground {
        return run_foreground(config);
    }

    match daemon::detect_daemon(&config.pid_file_path()) {
        Some(info) => println!("Daemon is already running (PID: {})", info.pid),
        None => {
            let info = daemon::spawn_daemon(config_path, &config.pid_file_path())
                .map_err(|e| Error::Daemon(format!("failed to start daemon: {}", e)))?;
            println!("Daemon started (PID: {})", info.pid);
        }
    }
    Ok(())
}

/// Stop the daemon if it is running, then start it again.
pub fn restart(config_path: &Path) -> Result<()> {
    stop(config_path)?;
    start(config_path, false)
}

/// View daemon logs.
pub fn logs(config_path: &Path, follow: bool) -> Result<()> {
    let config = config::load(config_path)?;
    let log_path = config.log_file_path();

    if !log_path.exists() {
        println!("No daemon logs found at {}", log_path.display());
        return Ok(());
    }

    if follow {
        let status = std::process::Command::new("tail")
            .arg("-f")
            .arg(&log_path)
            .status()?;

        if !status.success() {
            return Err(Error::Io(std::io::Error::other("tail command failed")));
        }
    } else {
        let content = std::fs::read_to_string(&log_path)?;
        print!("{}", content);
    }

    Ok(())
}

/// Runs the sync loop in this process until interrupted.
fn run_foreground(config: hs_core::Config) -> Result<()> {
    let shutdown = install_signal_handlers()?;
    let mut controller = Controller::new(config, shutdown);
    controller.run(|| {
        println!(
            "Daemon running in foreground (PID: {}), press Ctrl-C to stop",
            std::process::id()
        );
        let _ = std::io::stdout().flush();
    })?;
    println!("Daemon stopped.");
    Ok(())
}
