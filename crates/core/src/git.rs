// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Thin wrapper around the `git` executable.
//!
//! Commands run non-interactively inside one working copy. A default author
//! and committer identity is supplied when the environment has none, so
//! commits work on freshly provisioned machines.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::{mentions_permission, Error, Result};

const DEFAULT_IDENTITY_NAME: &str = "histsync";
const DEFAULT_IDENTITY_EMAIL: &str = "histsync@localhost";

/// A git working copy rooted at `dir`.
#[derive(Debug, Clone)]
pub struct Repo {
    dir: PathBuf,
}

impl Repo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Repo { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Runs a git command, returning its stdout.
    ///
    /// Failures carry stderr and stdout together, since git reports merge
    /// conflicts on stdout. Authorization failures map to
    /// [`Error::PermissionDenied`].
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).to_string());
        }

        let mut text = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stdout.trim());
        }

        let command = args.join(" ");
        if mentions_permission(&text) {
            return Err(Error::PermissionDenied(format!("git {}: {}", command, text)));
        }
        Err(Error::Git {
            command,
            output: text,
        })
    }

    /// Runs a git command and reports only whether it exited successfully.
    pub fn succeeds(&self, args: &[&str]) -> bool {
        self.output(args).is_ok_and(|o| o.status.success())
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        tracing::trace!("git {}", args.join(" "));
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.dir)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        setup_git_env(&mut cmd);
        Ok(cmd.output()?)
    }

    /// Whether `dir` is itself the top of a working copy.
    pub fn is_repo(&self) -> bool {
        self.dir.join(".git").exists()
    }

    /// Whether a merge is in progress.
    pub fn has_merge_head(&self) -> bool {
        self.dir.join(".git").join("MERGE_HEAD").exists()
    }

    /// Whether `rev` resolves to an object.
    pub fn rev_exists(&self, rev: &str) -> bool {
        self.succeeds(&["rev-parse", "--verify", "--quiet", rev])
    }

    pub fn local_branch_exists(&self, branch: &str) -> bool {
        self.rev_exists(&format!("refs/heads/{branch}"))
    }

    pub fn remote_branch_exists(&self, remote: &str, branch: &str) -> bool {
        self.rev_exists(&format!("refs/remotes/{remote}/{branch}"))
    }

    /// Whether HEAD points at a commit yet.
    pub fn has_commits(&self) -> bool {
        self.rev_exists("HEAD")
    }

    /// Name of the checked-out branch, even when it has no commits.
    pub fn current_branch(&self) -> Option<String> {
        self.run(&["symbolic-ref", "--short", "HEAD"])
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// URL configured for `remote`, if it exists.
    pub fn remote_url(&self, remote: &str) -> Option<String> {
        self.run(&["remote", "get-url", remote])
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Contents of `path` at `rev`, or `None` if either does not exist.
    pub fn show(&self, rev: &str, path: &str) -> Option<String> {
        self.run(&["show", &format!("{rev}:{path}")]).ok()
    }

    /// Whether the index differs from HEAD.
    pub fn has_staged_changes(&self) -> bool {
        if !self.has_commits() {
            return true;
        }
        !self.succeeds(&["diff", "--cached", "--quiet"])
    }

    /// Collects the facts needed to judge whether the working copy is usable.
    pub fn status(&self, remote: &str) -> Result<RepoStatus> {
        let porcelain = self.run(&["status", "--porcelain", "--untracked-files=no"])?;
        let unmerged = self.run(&["ls-files", "--unmerged"])?;
        Ok(RepoStatus {
            dirty: !porcelain.trim().is_empty(),
            conflicted: self.has_merge_head() || !unmerged.trim().is_empty(),
            remote_url: self.remote_url(remote),
        })
    }
}

/// Observed state of an existing working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// Tracked files have uncommitted modifications.
    pub dirty: bool,
    /// A merge is in progress or the index has unmerged entries.
    pub conflicted: bool,
    /// URL of the configured remote, if any.
    pub remote_url: Option<String>,
}

/// Why a working copy cannot be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unusable {
    Dirty,
    Conflicted,
    MissingRemote,
    WrongRemote { found: String },
    /// Git could not report on the working copy at all.
    Unreadable(String),
}

impl fmt::Display for Unusable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unusable::Dirty => f.write_str("working copy has uncommitted changes"),
            Unusable::Conflicted => f.write_str("working copy is mid-merge"),
            Unusable::MissingRemote => f.write_str("remote is not configured"),
            Unusable::WrongRemote { found } => write!(f, "remote points at {found}"),
            Unusable::Unreadable(e) => write!(f, "cannot read repository status: {e}"),
        }
    }
}

/// Verdict on an existing working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoHealth {
    Usable,
    MustReclone(Unusable),
}

impl RepoHealth {
    /// Decides whether a working copy can be reused as-is.
    ///
    /// Anything short of a clean tree linked to `expected_url` calls for a
    /// fresh clone; in-place repair is never attempted.
    pub fn assess(status: &RepoStatus, expected_url: &str) -> RepoHealth {
        if status.conflicted {
            return RepoHealth::MustReclone(Unusable::Conflicted);
        }
        if status.dirty {
            return RepoHealth::MustReclone(Unusable::Dirty);
        }
        match &status.remote_url {
            None => RepoHealth::MustReclone(Unusable::MissingRemote),
            Some(url) if url != expected_url => {
                RepoHealth::MustReclone(Unusable::WrongRemote { found: url.clone() })
            }
            Some(_) => RepoHealth::Usable,
        }
    }
}

/// Sets up git environment variables for commits.
fn setup_git_env(cmd: &mut Command) {
    for (key, value) in [
        ("GIT_AUTHOR_NAME", DEFAULT_IDENTITY_NAME),
        ("GIT_AUTHOR_EMAIL", DEFAULT_IDENTITY_EMAIL),
        ("GIT_COMMITTER_NAME", DEFAULT_IDENTITY_NAME),
        ("GIT_COMMITTER_EMAIL", DEFAULT_IDENTITY_EMAIL),
    ] {
        if std::env::var(key).map(|v| v.is_empty()).unwrap_or(true) {
            cmd.env(key, value);
        }
    }
    // Never block on a credential prompt.
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    if std::env::var_os("GIT_SSH_COMMAND").is_none() {
        cmd.env("GIT_SSH_COMMAND", "ssh -o BatchMode=yes");
    }
    // Failure classification matches on English messages.
    cmd.env("LC_ALL", "C");
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
