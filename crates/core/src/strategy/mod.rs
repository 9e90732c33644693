// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transports for the shared history.
//!
//! Every transport implements [`SyncStrategy`]. The set of transports is
//! closed, so [`Strategy`] dispatches over an enum built from configuration
//! rather than a trait object.

mod git;
mod memory;
mod ssh;

pub use git::{GitSettings, GitState, GitStrategy, HISTORY_FILE};
pub use memory::MemoryStrategy;
pub use ssh::{OpenSsh, RemoteShell, ShellOutput, SshSettings, SshStrategy};

use crate::config::{Config, SyncType};
use crate::error::Result;
use crate::history::HistoryLog;

/// Read, write and clear operations against the shared history.
pub trait SyncStrategy {
    /// Fetches the current shared history.
    ///
    /// Returns an empty log, not an error, when nothing has been stored yet.
    fn read_remote_history(&mut self) -> Result<HistoryLog>;

    /// Merges `history` into the shared history and stores the result.
    ///
    /// Never a blind overwrite, and safe to repeat after a partial failure.
    fn write_remote_history(&mut self, history: &HistoryLog) -> Result<()>;

    /// Empties the shared history. Returns false if that did not happen.
    fn clear_remote_history(&mut self) -> bool;

    /// Releases transport resources. Safe to call more than once.
    fn cleanup(&mut self);
}

/// The configured transport.
pub enum Strategy {
    Git(GitStrategy),
    Ssh(SshStrategy<OpenSsh>),
    Memory(MemoryStrategy),
}

impl Strategy {
    /// Builds the transport selected by `settings.sync_type`.
    ///
    /// The git transport prepares its working copy here, so this can fail
    /// on an unreachable remote or an unwritable directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        tracing::info!("using {} transport", config.settings.sync_type);
        match config.settings.sync_type {
            SyncType::Git => Ok(Strategy::Git(GitStrategy::open(
                GitSettings::from_config(config),
            )?)),
            SyncType::Ssh => {
                let settings = SshSettings::from_config(config);
                let shell = OpenSsh::from_config(config);
                Ok(Strategy::Ssh(SshStrategy::new(settings, shell)))
            }
            SyncType::Memory => Ok(Strategy::Memory(MemoryStrategy::new())),
        }
    }

    pub fn sync_type(&self) -> SyncType {
        match self {
            Strategy::Git(_) => SyncType::Git,
            Strategy::Ssh(_) => SyncType::Ssh,
            Strategy::Memory(_) => SyncType::Memory,
        }
    }
}

impl SyncStrategy for Strategy {
    fn read_remote_history(&mut self) -> Result<HistoryLog> {
        match self {
            Strategy::Git(s) => s.read_remote_history(),
            Strategy::Ssh(s) => s.read_remote_history(),
            Strategy::Memory(s) => s.read_remote_history(),
        }
    }

    fn write_remote_history(&mut self, history: &HistoryLog) -> Result<()> {
        match self {
            Strategy::Git(s) => s.write_remote_history(history),
            Strategy::Ssh(s) => s.write_remote_history(history),
            Strategy::Memory(s) => s.write_remote_history(history),
        }
    }

    fn clear_remote_history(&mut self) -> bool {
        match self {
            Strategy::Git(s) => s.clear_remote_history(),
            Strategy::Ssh(s) => s.clear_remote_history(),
            Strategy::Memory(s) => s.clear_remote_history(),
        }
    }

    fn cleanup(&mut self) {
        match self {
            Strategy::Git(s) => s.cleanup(),
            Strategy::Ssh(s) => s.cleanup(),
            Strategy::Memory(s) => s.cleanup(),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
