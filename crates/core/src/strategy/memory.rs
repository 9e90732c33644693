// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-local transport, for tests and dry runs.

use crate::error::Result;
use crate::history::HistoryLog;
use crate::merge::merge;

use super::SyncStrategy;

/// Keeps the "remote" history in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStrategy {
    stored: HistoryLog,
}

impl MemoryStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `history` already stored.
    pub fn with_history(history: HistoryLog) -> Self {
        MemoryStrategy { stored: history }
    }

    pub fn stored(&self) -> &HistoryLog {
        &self.stored
    }
}

impl SyncStrategy for MemoryStrategy {
    fn read_remote_history(&mut self) -> Result<HistoryLog> {
        Ok(self.stored.clone())
    }

    fn write_remote_history(&mut self, history: &HistoryLog) -> Result<()> {
        self.stored = merge(&self.stored, history);
        Ok(())
    }

    fn clear_remote_history(&mut self) -> bool {
        self.stored = HistoryLog::new();
        true
    }

    fn cleanup(&mut self) {}
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
