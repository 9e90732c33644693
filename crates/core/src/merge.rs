// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Two-way history merge.
//!
//! Merge rules:
//! - Both inputs are concatenated, left first
//! - Events are deduplicated by `(timestamp, command)`
//! - The survivors are stably sorted by timestamp
//!
//! The merge is a set union with no common-ancestor awareness. An entry
//! deleted on one side reappears if the other side still has it.

use std::collections::HashSet;

use crate::event::Event;
use crate::history::HistoryLog;

/// Merges two logs into one deduplicated, time-ordered log.
///
/// Idempotent, and the resulting set of events does not depend on argument
/// order. Events sharing a timestamp keep the order in which they were first
/// seen.
pub fn merge(a: &HistoryLog, b: &HistoryLog) -> HistoryLog {
    merge_all([a, b])
}

/// Merges raw history text, dropping lines that do not parse.
pub fn merge_lines(a: &str, b: &str) -> HistoryLog {
    merge(&HistoryLog::parse(a), &HistoryLog::parse(b))
}

/// Merges any number of logs with the same rules as [`merge`].
pub fn merge_all<'a>(logs: impl IntoIterator<Item = &'a HistoryLog>) -> HistoryLog {
    let mut seen: HashSet<(i64, &str)> = HashSet::new();
    let mut events: Vec<Event> = Vec::new();

    for event in logs.into_iter().flat_map(HistoryLog::iter) {
        if seen.insert(event.key()) {
            events.push(event.clone());
        }
    }

    events.sort_by_key(|e| e.timestamp);
    HistoryLog::from_events(events)
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
