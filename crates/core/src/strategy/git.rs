// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Git-backed transport.
//!
//! The shared history is a single `history.txt` in a git repository. A local
//! working copy is prepared on construction, then every read pulls and every
//! write commits and pushes. Concurrent writers are serialized by push
//! rejection: a rejected push pulls (resolving conflicts by merging events)
//! and tries again.
//!
//! Without a repository URL the working copy is local-only and nothing is
//! pushed or pulled.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::{Repo, RepoHealth, Unusable};
use crate::history::HistoryLog;
use crate::merge::{merge, merge_all};
use crate::retry::{retry_transient, DEFAULT_ATTEMPTS};

use super::SyncStrategy;

/// Tracked file holding the shared history.
pub const HISTORY_FILE: &str = "history.txt";

/// Push attempts within a single write, each preceded by recovery.
const PUSH_ROUNDS: u32 = 3;

/// Setup progress of the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GitState {
    Uninitialized,
    DirectoryReady,
    RepoReady,
    RemoteLinked,
    BranchReady,
    Operational,
}

/// Everything the git transport needs from configuration.
#[derive(Debug, Clone)]
pub struct GitSettings {
    pub work_dir: PathBuf,
    pub url: Option<String>,
    pub remote: String,
    pub branch: String,
    /// The shell history, folded in while resolving conflicts.
    pub local_history: PathBuf,
    pub attempts: u32,
}

impl GitSettings {
    pub fn from_config(config: &Config) -> Self {
        GitSettings {
            work_dir: config.git_repo_path(),
            url: config.git.url().map(String::from),
            remote: config.git.remote_name.clone(),
            branch: config.git.branch.clone(),
            local_history: config.local_history_path(),
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

pub struct GitStrategy {
    settings: GitSettings,
    repo: Repo,
    state: GitState,
}

impl GitStrategy {
    /// Prepares the working copy and returns an operational transport.
    pub fn open(settings: GitSettings) -> Result<Self> {
        let repo = Repo::new(&settings.work_dir);
        let mut strategy = GitStrategy {
            settings,
            repo,
            state: GitState::Uninitialized,
        };
        strategy.prepare_directory()?;
        strategy.prepare_repo()?;
        strategy.link_remote()?;
        strategy.prepare_branch()?;
        strategy.configure_merge()?;
        Ok(strategy)
    }

    pub fn state(&self) -> GitState {
        self.state
    }

    /// Path of the tracked history file in the working copy.
    pub fn history_path(&self) -> PathBuf {
        self.settings.work_dir.join(HISTORY_FILE)
    }

    fn advance(&mut self, next: GitState) {
        tracing::debug!("git transport: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn remote_ref(&self) -> String {
        format!("{}/{}", self.settings.remote, self.settings.branch)
    }

    fn prepare_directory(&mut self) -> Result<()> {
        let dir = &self.settings.work_dir;
        let unwritable = |e: std::io::Error| {
            Error::PermissionDenied(format!("cannot write to {}: {}", dir.display(), e))
        };
        fs::create_dir_all(dir).map_err(unwritable)?;
        tempfile::tempfile_in(dir).map_err(unwritable)?;
        self.advance(GitState::DirectoryReady);
        Ok(())
    }

    fn prepare_repo(&mut self) -> Result<()> {
        match self.settings.url.clone() {
            None => {
                if !self.repo.is_repo() {
                    self.init_repo()?;
                }
            }
            Some(url) if self.repo.is_repo() => {
                let health = match self.repo.status(&self.settings.remote) {
                    Ok(status) => RepoHealth::assess(&status, &url),
                    Err(e) => RepoHealth::MustReclone(Unusable::Unreadable(e.to_string())),
                };
                if let RepoHealth::MustReclone(reason) = health {
                    tracing::warn!(
                        "recreating {}: {}",
                        self.settings.work_dir.display(),
                        reason
                    );
                    self.clone_fresh(&url)?;
                }
            }
            Some(url) => {
                if !is_empty_dir(&self.settings.work_dir)? {
                    tracing::warn!(
                        "{} is not a git repository, replacing its contents",
                        self.settings.work_dir.display()
                    );
                }
                self.clone_fresh(&url)?;
            }
        }
        self.advance(GitState::RepoReady);
        Ok(())
    }

    /// Empties the working directory and clones into it. Falls back to an
    /// empty repository when the remote cannot be cloned.
    fn clone_fresh(&self, url: &str) -> Result<()> {
        empty_dir(&self.settings.work_dir)?;
        let cloned = self
            .repo
            .run(&["clone", "--quiet", "--origin", &self.settings.remote, url, "."]);
        match cloned {
            Ok(_) => Ok(()),
            Err(e) if e.is_permanent() => Err(e),
            Err(e) => {
                tracing::warn!("clone of {} failed, starting empty: {}", url, e);
                empty_dir(&self.settings.work_dir)?;
                self.init_repo()
            }
        }
    }

    fn init_repo(&self) -> Result<()> {
        self.repo.run(&["init", "--quiet"])?;
        let head = format!("refs/heads/{}", self.settings.branch);
        self.repo.run(&["symbolic-ref", "HEAD", &head])?;
        Ok(())
    }

    fn link_remote(&mut self) -> Result<()> {
        if let Some(url) = self.settings.url.clone() {
            let remote = self.settings.remote.clone();
            match self.repo.remote_url(&remote) {
                None => {
                    self.repo.run(&["remote", "add", &remote, &url])?;
                }
                Some(existing) if existing != url => {
                    self.repo.run(&["remote", "set-url", &remote, &url])?;
                }
                Some(_) => {}
            }
            self.fetch()?;
        }
        self.advance(GitState::RemoteLinked);
        Ok(())
    }

    fn prepare_branch(&mut self) -> Result<()> {
        let branch = self.settings.branch.clone();
        let remote_ref = self.remote_ref();
        let tracking = self.settings.url.is_some()
            && self
                .repo
                .remote_branch_exists(&self.settings.remote, &branch);

        if self.repo.local_branch_exists(&branch) {
            if self.repo.current_branch().as_deref() != Some(branch.as_str()) {
                self.repo.run(&["checkout", "--quiet", &branch])?;
            }
            if tracking {
                let upstream = format!("--set-upstream-to={remote_ref}");
                self.repo.run(&["branch", "--quiet", &upstream])?;
            }
        } else if tracking {
            self.repo
                .run(&["checkout", "--quiet", "-b", &branch, "--track", &remote_ref])?;
        } else if self.repo.has_commits() {
            self.repo.run(&["checkout", "--quiet", "-b", &branch])?;
        } else {
            let head = format!("refs/heads/{branch}");
            self.repo.run(&["symbolic-ref", "HEAD", &head])?;
        }

        self.ensure_history_file()?;

        if self.settings.url.is_some() && !tracking {
            tracing::info!("publishing branch {} to {}", branch, self.settings.remote);
            self.push(false)?;
        }
        self.advance(GitState::BranchReady);
        Ok(())
    }

    /// Makes sure the history file exists and is committed.
    ///
    /// A newly created file starts out with the local shell history.
    fn ensure_history_file(&self) -> Result<()> {
        let path = self.history_path();
        if !path.exists() {
            let seed = HistoryLog::read_file(&self.settings.local_history)?;
            tracing::debug!("seeding {} with {} local entries", HISTORY_FILE, seed.len());
            seed.write_file(&path)?;
        }
        if !self.repo.rev_exists(&format!("HEAD:{HISTORY_FILE}")) {
            self.commit_if_changed("Initialize history file")?;
        }
        Ok(())
    }

    fn configure_merge(&mut self) -> Result<()> {
        self.repo.run(&["config", "pull.rebase", "false"])?;
        self.advance(GitState::Operational);
        Ok(())
    }

    fn fetch(&self) -> Result<()> {
        self.repo
            .run(&["fetch", "--quiet", "--prune", &self.settings.remote])?;
        Ok(())
    }

    fn push(&self, force: bool) -> Result<()> {
        let mut args = vec!["push", "--quiet"];
        if force {
            args.push("--force");
        }
        args.extend([
            "-u",
            self.settings.remote.as_str(),
            self.settings.branch.as_str(),
        ]);
        self.repo.run(&args)?;
        Ok(())
    }

    /// Pulls the remote branch, resolving content conflicts by merging
    /// events.
    fn pull(&self) -> Result<()> {
        let pulled = self.repo.run(&[
            "pull",
            "--no-rebase",
            "--no-edit",
            "--allow-unrelated-histories",
            &self.settings.remote,
            &self.settings.branch,
        ]);
        match pulled {
            Ok(_) => Ok(()),
            Err(e) if e.is_conflict() || self.repo.has_merge_head() => {
                tracing::info!("merge conflict on pull, resolving");
                self.resolve_conflict()
            }
            Err(e) if e.is_missing_remote_ref() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Replaces a conflicted merge with an event-level merge.
    ///
    /// The working tree is reset, the shell history, the tracked file and
    /// the remote file are merged, and the remote head is recorded as a
    /// parent so the next push fast-forwards.
    fn resolve_conflict(&self) -> Result<()> {
        if self.repo.has_merge_head() {
            if let Err(e) = self.repo.run(&["merge", "--abort"]) {
                tracing::debug!("merge --abort: {}", e);
            }
        }
        self.repo.run(&["reset", "--hard", "--quiet"])?;

        let path = self.history_path();
        let local = HistoryLog::read_file(&self.settings.local_history)?;
        let tracked = HistoryLog::read_file(&path)?;
        let remote = self.remote_history();
        let merged = merge_all([&local, &tracked, &remote]);

        self.repo.run(&[
            "merge",
            "--quiet",
            "-s",
            "ours",
            "--no-edit",
            "--allow-unrelated-histories",
            &self.remote_ref(),
        ])?;
        merged.write_file(&path)?;
        self.commit_if_changed("Resolve merge conflict")?;
        Ok(())
    }

    /// Pushes, recovering from rejections by pulling first.
    fn push_with_recovery(&self) -> Result<()> {
        let mut round = 1;
        loop {
            let err = match self.push(false) {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            if err.is_permanent() || round >= PUSH_ROUNDS {
                return Err(err);
            }
            if err.is_unrelated_histories() {
                tracing::info!("push refused for unrelated histories, pulling");
                self.pull()?;
            } else if err.is_rejected() || err.is_conflict() {
                tracing::info!("push rejected, resetting and pulling");
                self.discard_local_changes()?;
                self.fetch()?;
                self.pull()?;
            } else {
                return Err(err);
            }
            round += 1;
        }
    }

    /// Stages the history file and commits it if anything changed.
    fn commit_if_changed(&self, message: &str) -> Result<bool> {
        self.repo.run(&["add", HISTORY_FILE])?;
        if !self.repo.has_staged_changes() {
            return Ok(false);
        }
        self.repo.run(&["commit", "--quiet", "-m", message])?;
        tracing::debug!("committed: {}", message);
        Ok(true)
    }

    /// Throws away uncommitted edits and any half-finished merge.
    fn discard_local_changes(&self) -> Result<()> {
        if self.repo.has_merge_head() {
            self.repo.run(&["merge", "--abort"])?;
        }
        if self.repo.has_commits() {
            self.repo.run(&["reset", "--hard", "--quiet"])?;
        }
        Ok(())
    }

    /// The history file as of the last fetch of the remote branch.
    fn remote_history(&self) -> HistoryLog {
        self.repo
            .show(&self.remote_ref(), HISTORY_FILE)
            .map(|text| HistoryLog::parse(&text))
            .unwrap_or_default()
    }

    fn read_once(&self) -> Result<HistoryLog> {
        if self.settings.url.is_none() {
            return HistoryLog::read_file(&self.history_path());
        }

        self.discard_local_changes()?;
        match self.fetch() {
            Err(e) if e.is_missing_remote_ref() => return Ok(HistoryLog::new()),
            other => other?,
        }
        if !self
            .repo
            .remote_branch_exists(&self.settings.remote, &self.settings.branch)
        {
            tracing::debug!("{} does not exist yet", self.remote_ref());
            return Ok(HistoryLog::new());
        }
        self.pull()?;

        let tracked = HistoryLog::read_file(&self.history_path())?;
        Ok(merge(&tracked, &self.remote_history()))
    }

    fn write_once(&self, history: &HistoryLog) -> Result<()> {
        let path = self.history_path();
        let current = HistoryLog::read_file(&path)?;
        merge(&current, history).write_file(&path)?;
        self.commit_if_changed("Sync history")?;

        if self.settings.url.is_some() {
            self.push_with_recovery()?;
        }
        Ok(())
    }

    fn clear_once(&self) -> Result<()> {
        self.discard_local_changes()?;
        HistoryLog::new().write_file(&self.history_path())?;
        self.commit_if_changed("Clear remote history")?;

        if self.settings.url.is_none() {
            return Ok(());
        }
        self.push(true)?;
        self.fetch()?;
        match self.repo.show(&self.remote_ref(), HISTORY_FILE) {
            Some(text) if !text.trim().is_empty() => Err(Error::Verification(format!(
                "{}:{} still has content after clear",
                self.remote_ref(),
                HISTORY_FILE
            ))),
            _ => Ok(()),
        }
    }
}

impl SyncStrategy for GitStrategy {
    fn read_remote_history(&mut self) -> Result<HistoryLog> {
        retry_transient(self.settings.attempts, || self.read_once())
    }

    fn write_remote_history(&mut self, history: &HistoryLog) -> Result<()> {
        retry_transient(self.settings.attempts, || self.write_once(history))
    }

    /// Force-pushes an empty history, discarding anything another host
    /// pushed since our last fetch.
    fn clear_remote_history(&mut self) -> bool {
        match retry_transient(self.settings.attempts, || self.clear_once()) {
            Ok(()) => {
                tracing::info!("remote history cleared");
                true
            }
            Err(e) => {
                tracing::error!("failed to clear remote history: {}", e);
                false
            }
        }
    }

    fn cleanup(&mut self) {
        if self.repo.has_merge_head() {
            if let Err(e) = self.repo.run(&["merge", "--abort"]) {
                tracing::warn!("failed to abort leftover merge: {}", e);
            }
        }
    }
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

/// Removes everything inside `dir`, keeping the directory itself.
fn empty_dir(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && !path.is_symlink() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
