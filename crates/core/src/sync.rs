// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One reconciliation cycle between the local history file and the shared
//! history.

use std::path::Path;

use crate::error::Result;
use crate::history::HistoryLog;
use crate::merge::merge;
use crate::strategy::SyncStrategy;

/// Entry counts observed during a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries in the local file when the cycle started.
    pub local: usize,
    /// Entries in the shared history before the cycle wrote to it.
    pub remote: usize,
    /// Entries in the local file after the cycle.
    pub merged: usize,
}

/// Reconciles `local_path` with the shared history.
///
/// Both sides end up holding the union of their events. The local file is
/// re-read just before it is rewritten so that commands the shell appended
/// while the transport was busy are kept.
pub fn sync_history<S: SyncStrategy + ?Sized>(
    strategy: &mut S,
    local_path: &Path,
) -> Result<SyncReport> {
    let remote = strategy.read_remote_history()?;
    let local = HistoryLog::read_file(local_path)?;
    tracing::debug!("local {} entries, remote {}", local.len(), remote.len());

    let merged = merge(&local, &remote);
    strategy.write_remote_history(&merged)?;

    let latest = HistoryLog::read_file(local_path)?;
    let result = merge(&merged, &latest);
    if result != latest {
        result.write_file(local_path)?;
    }

    let report = SyncReport {
        local: local.len(),
        remote: remote.len(),
        merged: result.len(),
    };
    tracing::info!(
        "synced: local {} remote {} merged {}",
        report.local,
        report.remote,
        report.merged
    );
    Ok(report)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
