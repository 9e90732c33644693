// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! A single shell history record.
//!
//! Records use the extended history line format:
//!
//! ```text
//! : <timestamp>:<duration>;<command>
//! ```
//!
//! The duration field is accepted on input but always written as `0`.
//! Only the first `:` after the timestamp and the first `;` after the
//! duration are structural, so commands may contain either character.

use std::fmt;

/// Leading sentinel of every history line.
const PREFIX: &str = ": ";

/// One timestamped shell command.
///
/// Two events with the same `(timestamp, command)` pair are the same history
/// entry, even when recorded independently on different machines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Raw command text, without the line terminator.
    pub command: String,
}

impl Event {
    pub fn new(timestamp: i64, command: impl Into<String>) -> Self {
        Event {
            timestamp,
            command: command.into(),
        }
    }

    /// Parses one history line.
    ///
    /// Returns `None` for anything that does not match the line grammar:
    /// blank lines, a missing sentinel or separator, or a non-numeric
    /// timestamp or duration. A trailing `\n` or `\r\n` is ignored.
    pub fn parse(line: &str) -> Option<Event> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        let rest = line.strip_prefix(PREFIX)?;
        let (timestamp, rest) = rest.split_once(':')?;
        let (duration, command) = rest.split_once(';')?;

        if !is_decimal(timestamp) || !is_decimal(duration) {
            return None;
        }
        let timestamp = timestamp.parse().ok()?;

        Some(Event::new(timestamp, command))
    }

    /// Canonical line form, including the trailing newline.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }

    /// Identity used for deduplication.
    pub fn key(&self) -> (i64, &str) {
        (self.timestamp, self.command.as_str())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}:0;{}", self.timestamp, self.command)
    }
}

fn is_decimal(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
