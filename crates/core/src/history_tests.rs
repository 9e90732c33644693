// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

#[test]
fn parse_drops_garbage_lines() {
    let log = HistoryLog::parse(": 1000:0;a\ngarbage\n\n: 2000:0;b\n");
    assert_eq!(log.len(), 2);
    assert_eq!(log.events()[0], Event::new(1000, "a"));
    assert_eq!(log.events()[1], Event::new(2000, "b"));
}

#[test]
fn parse_keeps_file_order() {
    let log = HistoryLog::parse(": 3:0;c\n: 1:0;a\n");
    let stamps: Vec<i64> = log.iter().map(|e| e.timestamp).collect();
    assert_eq!(stamps, vec![3, 1]);
}

#[test]
fn to_text_is_canonical() {
    let log = HistoryLog::parse(": 1000:9;a\r\n: 2000:0;b");
    assert_eq!(log.to_text(), ": 1000:0;a\n: 2000:0;b\n");
}

#[test]
fn empty_log_serializes_to_empty_text() {
    assert_eq!(HistoryLog::new().to_text(), "");
}

#[test]
fn read_missing_file_is_empty() {
    let temp = TempDir::new().unwrap();
    let log = HistoryLog::read_file(&temp.path().join("nope")).unwrap();
    assert!(log.is_empty());
}

#[test]
fn read_falls_back_to_latin1() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("hist");
    // 0xE9 is 'é' in Latin-1 and invalid on its own in UTF-8.
    std::fs::write(&path, b": 1000:0;echo caf\xE9\n").unwrap();

    let log = HistoryLog::read_file(&path).unwrap();
    assert_eq!(log.events()[0].command, "echo café");
}

#[test]
fn write_then_read_preserves_events() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/history");
    let log = HistoryLog::from_events(vec![Event::new(1, "a"), Event::new(2, "b")]);

    log.write_file(&path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), ": 1:0;a\n: 2:0;b\n");
    assert_eq!(HistoryLog::read_file(&path).unwrap(), log);
}

#[test]
fn write_replaces_existing_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("history");
    std::fs::write(&path, ": 9:0;old\n").unwrap();

    HistoryLog::new().write_file(&path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    // No temporary files are left behind.
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn write_through_symlink_updates_link_target() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let real = temp.path().join("dotfiles/zsh_history");
    std::fs::create_dir_all(real.parent().unwrap()).unwrap();
    std::fs::write(&real, ": 1:0;a\n").unwrap();
    let link = temp.path().join(".zsh_history");
    symlink(&real, &link).unwrap();

    HistoryLog::parse(": 1:0;a\n: 2:0;b\n")
        .write_file(&link)
        .unwrap();

    assert!(std::fs::symlink_metadata(&link)
        .unwrap()
        .file_type()
        .is_symlink());
    assert_eq!(
        std::fs::read_to_string(&real).unwrap(),
        ": 1:0;a\n: 2:0;b\n"
    );
}

#[test]
fn write_through_dangling_symlink_creates_target() {
    use std::os::unix::fs::symlink;

    let temp = TempDir::new().unwrap();
    let link = temp.path().join(".zsh_history");
    symlink("zsh_history.real", &link).unwrap();

    HistoryLog::parse(": 1:0;a\n").write_file(&link).unwrap();

    assert!(std::fs::symlink_metadata(&link)
        .unwrap()
        .file_type()
        .is_symlink());
    assert_eq!(
        std::fs::read_to_string(temp.path().join("zsh_history.real")).unwrap(),
        ": 1:0;a\n"
    );
}

#[test]
fn write_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("zsh_history");
    std::fs::write(&path, ": 1:0;a\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

    HistoryLog::parse(": 2:0;b\n").write_file(&path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
}
