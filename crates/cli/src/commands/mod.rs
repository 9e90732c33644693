// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod config;
pub mod daemon;
pub mod sync;

use hs_core::{Config, Strategy, SyncStrategy};

use crate::error::Result;

/// Builds the configured transport, runs `op` on it, then releases it.
///
/// Cleanup runs whether or not `op` succeeds.
pub fn with_strategy<T>(
    config: &Config,
    op: impl FnOnce(&mut Strategy) -> Result<T>,
) -> Result<T> {
    let mut strategy = Strategy::from_config(config)?;
    let result = op(&mut strategy);
    strategy.cleanup();
    result
}
