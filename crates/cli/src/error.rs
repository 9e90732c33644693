// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the hsrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("permission denied: {0}\n  hint: check write access and credentials for the history store")]
    PermissionDenied(String),

    #[error("sync failed: {0}")]
    Sync(String),

    #[error("remote history was not cleared\n  hint: see the log output above, or retry with --verbose")]
    ClearFailed,

    #[error("daemon is not running")]
    DaemonNotRunning,

    #[error("daemon error: {0}")]
    Daemon(String),
}

/// A specialized Result type for hsrs operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<hs_core::Error> for Error {
    fn from(e: hs_core::Error) -> Self {
        use hs_core::Error as Core;
        match e {
            Core::Io(e) => Error::Io(e),
            Core::Config(msg) => Error::Config(msg),
            e @ Core::UnknownSyncType(_) => Error::Config(e.to_string()),
            Core::PermissionDenied(msg) => Error::PermissionDenied(msg),
            e @ (Core::Git { .. }
            | Core::Ssh { .. }
            | Core::Timeout { .. }
            | Core::Verification(_)) => Error::Sync(e.to_string()),
            Core::NotRunning => Error::DaemonNotRunning,
            e @ (Core::AlreadyRunning(_) | Core::StopTimeout { .. }) => {
                Error::Daemon(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
