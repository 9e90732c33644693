// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hs-core: Shared library for histsync
//!
//! This crate provides the history model, the merge algorithm, the sync
//! transports and the daemon controller used by both the histsync CLI and
//! the histsyncd daemon.

pub mod config;
pub mod daemon;
pub mod error;
pub mod event;
pub mod git;
pub mod history;
pub mod merge;
pub mod pidfile;
pub mod retry;
pub mod strategy;
pub mod sync;

pub use config::{Config, SyncType};
pub use daemon::{install_signal_handlers, Controller, DaemonState};
pub use error::{Error, Result};
pub use event::Event;
pub use history::HistoryLog;
pub use merge::{merge, merge_all, merge_lines};
pub use retry::{retry, retry_transient, DEFAULT_ATTEMPTS};
pub use strategy::{GitStrategy, MemoryStrategy, SshStrategy, Strategy, SyncStrategy};
pub use sync::{sync_history, SyncReport};
