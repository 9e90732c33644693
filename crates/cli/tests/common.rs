// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn histsync() -> Command {
    let mut cmd = cargo_bin_cmd!("histsync");
    cmd.env_remove("HISTSYNC_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// A temp directory holding a memory-transport config.
pub struct Env {
    pub temp: TempDir,
}

impl Env {
    pub fn new() -> Self {
        Self::with_settings("sync_type = \"memory\"\n")
    }

    /// Writes a config whose `[settings]` table holds `settings`.
    pub fn with_settings(settings: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().display().to_string();
        let config = format!(
            "[paths]\n\
             local_history = \"{dir}/zsh_history\"\n\
             git_repo = \"{dir}/repo\"\n\
             log_file = \"{dir}/histsync.log\"\n\
             pid_file = \"{dir}/histsync.pid\"\n\
             \n\
             [settings]\n\
             {settings}"
        );
        std::fs::write(temp.path().join("config.toml"), config).unwrap();
        Env { temp }
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.path().join("config.toml")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    /// `histsync --config <this config>`
    pub fn cmd(&self) -> Command {
        let mut cmd = histsync();
        cmd.arg("--config").arg(self.config_path());
        cmd
    }

    pub fn write_history(&self, text: &str) {
        std::fs::write(self.path("zsh_history"), text).unwrap();
    }

    pub fn read_history(&self) -> String {
        std::fs::read_to_string(self.path("zsh_history")).unwrap()
    }
}
