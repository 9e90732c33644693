// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use similar_asserts::assert_eq;
use std::collections::BTreeSet;

fn log(text: &str) -> HistoryLog {
    HistoryLog::parse(text)
}

fn as_set(log: &HistoryLog) -> BTreeSet<(i64, String)> {
    log.iter()
        .map(|e| (e.timestamp, e.command.clone()))
        .collect()
}

#[test]
fn two_sided_merge() {
    let local = log(": 1000:0;a\n: 2000:0;b\n");
    let remote = log(": 1500:0;c\n: 2000:0;b\n");

    let merged = merge(&local, &remote);

    assert_eq!(merged.to_text(), ": 1000:0;a\n: 1500:0;c\n: 2000:0;b\n");
}

#[test]
fn merge_is_idempotent() {
    let x = log(": 3:0;c\n: 1:0;a\n: 2:0;b\n: 1:0;a\n");
    let once = merge(&x, &HistoryLog::new());

    assert_eq!(merge(&x, &x), once);
    assert_eq!(merge(&once, &once), once);
}

#[test]
fn merge_result_set_is_commutative() {
    let a = log(": 5:0;x\n: 1:0;y\n: 3:0;z\n");
    let b = log(": 3:0;w\n: 5:0;x\n: 2:0;v\n");

    let ab = merge(&a, &b);
    let ba = merge(&b, &a);

    assert_eq!(as_set(&ab), as_set(&ba));
    let stamps = |l: &HistoryLog| l.iter().map(|e| e.timestamp).collect::<Vec<_>>();
    assert_eq!(stamps(&ab), stamps(&ba));
}

#[test]
fn duplicate_pairs_collapse_to_one() {
    let a = log(": 1000:0;ls\n");
    let b = log(": 1000:7;ls\n");

    let merged = merge(&a, &b);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.events()[0], Event::new(1000, "ls"));
}

#[test]
fn same_timestamp_different_commands_are_kept() {
    let merged = merge(&log(": 1000:0;ls\n"), &log(": 1000:0;pwd\n"));
    assert_eq!(merged.len(), 2);
}

#[test]
fn ties_keep_first_seen_order() {
    let merged = merge(&log(": 9:0;second\n: 1:0;first\n"), &log(": 9:0;third\n"));
    let commands: Vec<&str> = merged.iter().map(|e| e.command.as_str()).collect();
    assert_eq!(commands, vec!["first", "second", "third"]);
}

#[test]
fn output_is_sorted() {
    let merged = merge(
        &log(": 50:0;e\n: 10:0;a\n: 30:0;c\n"),
        &log(": 40:0;d\n: 20:0;b\n: 10:0;a\n"),
    );
    assert!(merged
        .events()
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn merge_lines_drops_garbage() {
    let merged = merge_lines("garbage\n: 2:0;b\n", "not a line\n: 1:0;a\n");
    assert_eq!(merged.to_text(), ": 1:0;a\n: 2:0;b\n");
}

#[test]
fn deleted_entry_reappears_from_other_side() {
    let local = log(": 1:0;keep\n");
    let remote = log(": 1:0;keep\n: 2:0;secret\n");

    let merged = merge(&local, &remote);

    assert!(merged.iter().any(|e| e.command == "secret"));
}

#[test]
fn merge_all_handles_three_inputs() {
    let merged = merge_all([&log(": 3:0;c\n"), &log(": 1:0;a\n"), &log(": 2:0;b\n: 3:0;c\n")]);
    assert_eq!(merged.to_text(), ": 1:0;a\n: 2:0;b\n: 3:0;c\n");
}
