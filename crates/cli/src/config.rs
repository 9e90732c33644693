// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Locating and loading the configuration file.
//!
//! The path comes from `--config`, then `HISTSYNC_CONFIG`, then the default
//! `~/.config/histsync/config.toml`. A missing file is created with defaults
//! on first use.

use std::path::{Path, PathBuf};

use hs_core::config::default_config_path;
use hs_core::Config;

use crate::env;
use crate::error::Result;

/// Picks the configuration file path, first match wins.
pub fn resolve_path(flag: Option<PathBuf>) -> PathBuf {
    pick_path(flag, env::config_path())
}

fn pick_path(flag: Option<PathBuf>, from_env: Option<PathBuf>) -> PathBuf {
    flag.or(from_env).unwrap_or_else(default_config_path)
}

/// Loads the configuration, writing defaults if the file does not exist.
pub fn load(path: &Path) -> Result<Config> {
    let existed = path.exists();
    let config = Config::load_or_create(path)?;
    if !existed {
        eprintln!("Created default configuration at {}", path.display());
    }
    tracing::debug!(
        "loaded config from {} (sync_type={})",
        path.display(),
        config.settings.sync_type
    );
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
