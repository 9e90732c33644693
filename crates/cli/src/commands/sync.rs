// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use hs_core::{sync_history, SyncReport, SyncStrategy};

use crate::config;
use crate::error::Result;

use super::with_strategy;

/// Run one reconciliation cycle.
pub fn run(config_path: &Path) -> Result<()> {
    let config = config::load(config_path)?;
    let local_path = config.local_history_path();
    let report = with_strategy(&config, |strategy| sync_with(strategy, &local_path))?;
    println!("{}", format_report(&report));
    Ok(())
}

pub(crate) fn sync_with<S: SyncStrategy>(strategy: &mut S, local_path: &Path) -> Result<SyncReport> {
    Ok(sync_history(strategy, local_path)?)
}

pub(crate) fn format_report(report: &SyncReport) -> String {
    let noun = if report.merged == 1 { "entry" } else { "entries" };
    format!(
        "Synced {} {} (local: {}, remote: {})",
        report.merged, noun, report.local, report.remote
    )
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
