// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use hs_core::SyncStrategy;

use crate::config;
use crate::error::{Error, Result};

use super::with_strategy;

/// Empty the shared history. The local history file is left alone.
pub fn run(config_path: &Path) -> Result<()> {
    let config = config::load(config_path)?;
    with_strategy(&config, clear_with)?;
    println!("Remote history cleared.");
    Ok(())
}

pub(crate) fn clear_with<S: SyncStrategy>(strategy: &mut S) -> Result<()> {
    if strategy.clear_remote_history() {
        Ok(())
    } else {
        Err(Error::ClearFailed)
    }
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
