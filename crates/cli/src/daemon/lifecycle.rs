// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: spawn, detect, stop.
//!
//! The daemon (histsyncd) is spawned as a background process and registers
//! itself in the PID file named by the configuration. The CLI never talks to
//! it directly; it only starts it, checks the PID file and signals it.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use hs_core::pidfile;

use crate::env;
use crate::error::{Error, Result};

/// Daemon binary name.
const DAEMON_BINARY: &str = "histsyncd";

/// Information about a running daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonInfo {
    /// Process ID of the daemon.
    pub pid: u32,
}

/// Detect if a daemon is registered and alive.
///
/// A stale PID file is removed.
pub fn detect_daemon(pid_path: &Path) -> Option<DaemonInfo> {
    pidfile::detect_running(pid_path).map(|pid| DaemonInfo { pid })
}

/// Find the histsyncd binary.
fn find_daemon_binary() -> PathBuf {
    locate_daemon_binary(env::daemon_binary(), std::env::current_exe().ok())
}

pub(crate) fn locate_daemon_binary(from_env: Option<PathBuf>, current_exe: Option<PathBuf>) -> PathBuf {
    // 1. Check HISTSYNC_DAEMON_BINARY env var
    if let Some(path) = from_env {
        return path;
    }

    // 2. Look next to the current executable
    if let Some(exe) = current_exe {
        let sibling = exe.with_file_name(DAEMON_BINARY);
        if sibling.exists() {
            return sibling;
        }
    }

    // 3. Fall back to PATH
    PathBuf::from(DAEMON_BINARY)
}

/// Spawn a daemon process for the given configuration.
///
/// Returns the running daemon if there already is one.
pub fn spawn_daemon(config_path: &Path, pid_path: &Path) -> Result<DaemonInfo> {
    if let Some(info) = detect_daemon(pid_path) {
        return Ok(info);
    }

    let child = launch(&find_daemon_binary(), config_path)?;
    // The PID file is written before READY, but a missing file should not
    // hide a daemon that is evidently up.
    Ok(detect_daemon(pid_path).unwrap_or(DaemonInfo { pid: child.id() }))
}

/// Starts `binary` and waits for it to print `READY`.
///
/// Fails with the daemon's stderr if it exits first.
pub(crate) fn launch(binary: &Path, config_path: &Path) -> Result<Child> {
    let mut child = Command::new(binary)
        .arg("--config")
        .arg(config_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::Daemon(format!(
                "failed to start {} ({}): {}",
                DAEMON_BINARY,
                binary.display(),
                e
            ))
        })?;

    // Wait for daemon to signal it's ready (writes "READY" to stdout)
    let mut ready = false;
    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(line) if line == "READY" => {
                    ready = true;
                    break;
                }
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    }

    if ready {
        return Ok(child);
    }

    // Stdout closed without READY: the daemon is exiting.
    let status = child.wait()?;
    let mut stderr_output = String::new();
    if let Some(mut stderr) = child.stderr.take() {
        let _ = stderr.read_to_string(&mut stderr_output);
    }
    Err(Error::Daemon(format!(
        "daemon process exited with status: {}\n{}",
        status,
        stderr_output.trim()
    )))
}

/// Stop the registered daemon, waiting for it to exit.
///
/// Returns the PID of the stopped daemon.
pub fn stop_daemon(pid_path: &Path) -> Result<u32> {
    Ok(pidfile::stop(pid_path, pidfile::STOP_TIMEOUT)?)
}
