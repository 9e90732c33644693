// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-file history logs.
//!
//! A log is always read and rewritten wholesale; there is no append protocol.
//! Unparseable lines are dropped while reading.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::event::Event;

/// An ordered sequence of history events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    events: Vec<Event>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        HistoryLog { events }
    }

    /// Parses a history file body, skipping lines that are not events.
    pub fn parse(text: &str) -> Self {
        HistoryLog {
            events: text.lines().filter_map(Event::parse).collect(),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Serializes every event in canonical form, one per line.
    pub fn to_text(&self) -> String {
        self.events.iter().map(Event::to_line).collect()
    }

    /// Reads a history file.
    ///
    /// A missing file is an empty log. Content that is not valid UTF-8 is
    /// decoded as Latin-1 so that foreign history files still load.
    pub fn read_file(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(Self::parse(&decode_text(bytes)))
    }

    /// Atomically replaces `path` with this log.
    ///
    /// The content is written to a temporary file next to the target which
    /// is then renamed over it. Symlinks are followed, so a linked history
    /// file keeps its link and the file behind it gets the new content. The
    /// target's permissions carry over. Missing parent directories are
    /// created.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let target = resolve_target(path);
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(self.to_text().as_bytes())?;
        if let Ok(meta) = fs::metadata(&target) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    }
}

/// The file a write to `path` should land in.
fn resolve_target(path: &Path) -> PathBuf {
    if let Ok(real) = fs::canonicalize(path) {
        return real;
    }
    // Dangling link: create the file it points at.
    match fs::read_link(path) {
        Ok(dest) => match path.parent() {
            Some(parent) => parent.join(dest),
            None => dest,
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Decodes history bytes as UTF-8, falling back to Latin-1.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("history is not utf-8, decoding as latin-1");
            e.into_bytes().iter().map(|&b| char::from(b)).collect()
        }
    }
}

impl From<Vec<Event>> for HistoryLog {
    fn from(events: Vec<Event>) -> Self {
        Self::from_events(events)
    }
}

impl FromIterator<Event> for HistoryLog {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::from_events(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
