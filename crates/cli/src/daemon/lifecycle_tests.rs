// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for daemon lifecycle management.

#![allow(clippy::unwrap_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};

use hs_core::pidfile::PidFile;

use super::lifecycle::*;
use crate::error::Error;

/// Writes an executable shell script standing in for histsyncd.
fn fake_daemon(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("histsyncd");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn pid_path(dir: &TempDir) -> PathBuf {
    dir.path().join("histsync.pid")
}

fn config_path(dir: &TempDir) -> PathBuf {
    dir.path().join("config.toml")
}

/// Reaps the child in the background so a stopped daemon does not linger
/// as a zombie that still answers signals.
fn reap(mut child: std::process::Child) {
    std::thread::spawn(move || {
        let _ = child.wait();
    });
}

#[test]
fn test_detect_daemon_no_pid_file() {
    let dir = tempdir().unwrap();
    assert_eq!(detect_daemon(&dir.path().join("histsync.pid")), None);
}

#[test]
fn test_detect_daemon_live_pid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("histsync.pid");
    let _holder = PidFile::acquire(&path).unwrap();

    assert_eq!(
        detect_daemon(&path),
        Some(DaemonInfo {
            pid: std::process::id()
        })
    );
}

#[test]
fn test_detect_daemon_cleans_up_garbage_pid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("histsync.pid");
    std::fs::write(&path, "not a pid").unwrap();

    assert_eq!(detect_daemon(&path), None);
    assert!(!path.exists());
}

#[test]
fn test_stop_daemon_not_running() {
    let dir = tempdir().unwrap();
    let result = stop_daemon(&dir.path().join("histsync.pid"));
    assert!(matches!(result, Err(Error::DaemonNotRunning)));
}

#[test]
fn test_binary_from_env_wins() {
    let path = locate_daemon_binary(
        Some(PathBuf::from("/opt/histsyncd")),
        Some(PathBuf::from("/usr/bin/histsync")),
    );
    assert_eq!(path, PathBuf::from("/opt/histsyncd"));
}

#[test]
fn test_binary_next_to_executable() {
    let dir = tempdir().unwrap();
    let sibling = dir.path().join("histsyncd");
    std::fs::write(&sibling, "").unwrap();

    let path = locate_daemon_binary(None, Some(dir.path().join("histsync")));

    assert_eq!(path, sibling);
}

#[test]
fn test_binary_falls_back_to_path() {
    let dir = tempdir().unwrap();
    let path = locate_daemon_binary(None, Some(dir.path().join("histsync")));
    assert_eq!(path, PathBuf::from("histsyncd"));
}

#[test]
fn test_launch_waits_for_ready_then_stop() {
    let dir = TempDir::new().unwrap();
    let pid = pid_path(&dir);
    // The registration lock is held here; the fake daemon only records its pid.
    let _holder = PidFile::acquire(&pid).unwrap();
    let binary = fake_daemon(
        &dir,
        &format!(
            "echo $$ > '{}'\necho starting\necho READY\nexec sleep 30",
            pid.display()
        ),
    );

    let child = launch(&binary, &config_path(&dir)).unwrap();
    let child_pid = child.id();
    reap(child);

    assert_eq!(detect_daemon(&pid), Some(DaemonInfo { pid: child_pid }));
    assert_eq!(stop_daemon(&pid).unwrap(), child_pid);
    assert!(!pid.exists());
}

#[test]
fn test_launch_passes_config_path() {
    let dir = TempDir::new().unwrap();
    let seen = dir.path().join("args");
    let binary = fake_daemon(
        &dir,
        &format!("echo \"$@\" > '{}'\necho READY", seen.display()),
    );

    let child = launch(&binary, Path::new("/tmp/histsync.toml")).unwrap();
    reap(child);

    assert_eq!(
        std::fs::read_to_string(&seen).unwrap().trim(),
        "--config /tmp/histsync.toml"
    );
}

#[test]
fn test_launch_reports_early_exit() {
    let dir = TempDir::new().unwrap();
    let binary = fake_daemon(&dir, "echo 'histsyncd: daemon already running (pid 1)' >&2\nexit 1");

    let err = launch(&binary, &config_path(&dir)).unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("exited"), "{msg}");
    assert!(msg.contains("already running"), "{msg}");
}

#[test]
fn test_launch_missing_binary() {
    let dir = TempDir::new().unwrap();
    let err = launch(&dir.path().join("nope"), &config_path(&dir)).unwrap_err();
    assert!(matches!(err, Error::Daemon(msg) if msg.contains("failed to start")));
}
