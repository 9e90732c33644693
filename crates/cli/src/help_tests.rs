// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use clap::CommandFactory;

#[test]
fn command_list_names_every_subcommand() {
    let listed = commands();
    for sub in crate::cli::Cli::command().get_subcommands() {
        let name = sub.get_name();
        if name == "help" {
            continue;
        }
        assert!(listed.contains(name), "{name} missing from help");
    }
}

#[test]
fn template_keeps_clap_placeholders() {
    let t = template();
    assert!(t.contains("{usage}"));
    assert!(t.contains("{options}"));
    assert!(t.contains("Options:"));
}

#[test]
fn quickstart_mentions_daemon() {
    assert!(quickstart().contains("daemon start"));
}
