// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry for transport operations.
//!
//! Attempts run back to back with no delay. Recovery comes from the
//! corrective work each attempt does (re-fetching, resetting), not from
//! waiting.

use crate::error::{Error, Result};

/// Attempts made by transport operations unless configured otherwise.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Runs `op` up to `max_attempts` times, returning the first success.
///
/// Every failure is logged. When all attempts fail, the error from the last
/// attempt is returned unchanged. At least one attempt is always made.
pub fn retry<T, E, F>(max_attempts: u32, op: F) -> std::result::Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> std::result::Result<T, E>,
{
    retry_until(max_attempts, |_| false, op)
}

/// Like [`retry`], but gives up at once on errors that retrying cannot fix.
pub fn retry_transient<T, F>(max_attempts: u32, op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    retry_until(max_attempts, Error::is_permanent, op)
}

fn retry_until<T, E, F, P>(max_attempts: u32, is_fatal: P, mut op: F) -> std::result::Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> std::result::Result<T, E>,
    P: Fn(&E) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts || is_fatal(&e) => {
                tracing::warn!("attempt {attempt}/{max_attempts} failed, giving up: {e}");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("attempt {attempt}/{max_attempts} failed: {e}");
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
