// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle management for the histsyncd process.

mod lifecycle;

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;

pub use lifecycle::{detect_daemon, spawn_daemon, stop_daemon};
