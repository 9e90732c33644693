// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn git(output: &str) -> Error {
    Error::Git {
        command: "push".into(),
        output: output.into(),
    }
}

#[parameterized(
    already_running = { Error::AlreadyRunning(42), "42" },
    not_running = { Error::NotRunning, "not running" },
    unknown_sync_type = { Error::UnknownSyncType("ftp".into()), "ftp" },
    stop_timeout = { Error::StopTimeout { pid: 7, secs: 10 }, "10s" },
    permission = { Error::PermissionDenied("/srv/history".into()), "/srv/history" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[parameterized(
    conflict = { "CONFLICT (add/add): Merge conflict in history.txt", true },
    automatic = { "Automatic merge failed; fix conflicts", true },
    clean = { "Already up to date.", false },
)]
fn classifies_conflicts(output: &str, expected: bool) {
    assert_eq!(git(output).is_conflict(), expected);
}

#[test]
fn classifies_unrelated_histories() {
    assert!(git("fatal: refusing to merge unrelated histories").is_unrelated_histories());
    assert!(!git("fatal: not a git repository").is_unrelated_histories());
}

#[test]
fn classifies_missing_remote_ref() {
    assert!(git("fatal: couldn't find remote ref main").is_missing_remote_ref());
}

#[parameterized(
    rejected = { "! [rejected] main -> main (fetch first)", true },
    non_fast_forward = { "error: failed to push some refs (non-fast-forward)", true },
    ok = { "Everything up-to-date", false },
)]
fn classifies_rejected_pushes(output: &str, expected: bool) {
    assert_eq!(git(output).is_rejected(), expected);
}

#[test]
fn only_permission_errors_are_permanent() {
    assert!(Error::PermissionDenied("x".into()).is_permanent());
    assert!(!git("rejected").is_permanent());
    assert!(!Error::Timeout {
        command: "cat".into(),
        secs: 10
    }
    .is_permanent());
}

#[test]
fn ssh_errors_are_classified_too() {
    let err = Error::Ssh {
        command: "cat".into(),
        stderr: "CONFLICT".into(),
    };
    assert!(err.is_conflict());
}

#[parameterized(
    denied = { "Permission denied (publickey).", true },
    auth = { "fatal: Authentication failed for 'https://x'", true },
    other = { "fatal: repository not found", false },
)]
fn detects_permission_messages(output: &str, expected: bool) {
    assert_eq!(mentions_permission(output), expected);
}
