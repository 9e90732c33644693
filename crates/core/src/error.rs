// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for hs-core operations.

use thiserror::Error;

/// All possible errors that can occur in hs-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("permission denied: {0}\n  hint: check write access and credentials for the history store")]
    PermissionDenied(String),

    #[error("git {command} failed: {output}")]
    Git { command: String, output: String },

    #[error("ssh command '{command}' failed: {stderr}")]
    Ssh { command: String, stderr: String },

    #[error("'{command}' timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("daemon already running (pid {0})")]
    AlreadyRunning(u32),

    #[error("daemon is not running")]
    NotRunning,

    #[error("daemon (pid {pid}) did not exit within {secs}s")]
    StopTimeout { pid: u32, secs: u64 },

    #[error("unknown sync type: '{0}'\n  hint: valid types are: git, ssh, memory")]
    UnknownSyncType(String),

    #[error("verification failed: {0}")]
    Verification(String),
}

impl Error {
    /// Returns true for failures that retrying cannot fix.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Error::PermissionDenied(_))
    }

    /// Diagnostic text of a failed git or ssh invocation.
    fn output(&self) -> Option<String> {
        match self {
            Error::Git { output, .. } => Some(output.to_lowercase()),
            Error::Ssh { stderr, .. } => Some(stderr.to_lowercase()),
            _ => None,
        }
    }

    /// A merge stopped on conflicting content.
    pub fn is_conflict(&self) -> bool {
        self.output()
            .is_some_and(|o| o.contains("conflict") || o.contains("automatic merge failed"))
    }

    /// Local and remote branches share no common ancestor.
    pub fn is_unrelated_histories(&self) -> bool {
        self.output()
            .is_some_and(|o| o.contains("unrelated histories"))
    }

    /// The remote does not have the requested branch yet.
    pub fn is_missing_remote_ref(&self) -> bool {
        self.output()
            .is_some_and(|o| o.contains("couldn't find remote ref"))
    }

    /// The remote refused a push because it has commits we lack.
    pub fn is_rejected(&self) -> bool {
        self.output().is_some_and(|o| {
            o.contains("rejected") || o.contains("non-fast-forward") || o.contains("fetch first")
        })
    }
}

/// Returns true if tool output reports an authorization failure.
pub(crate) fn mentions_permission(output: &str) -> bool {
    let lower = output.to_lowercase();
    lower.contains("permission denied")
        || lower.contains("authentication failed")
        || lower.contains("could not read username")
}

/// A specialized Result type for hs-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
