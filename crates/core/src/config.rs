// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration management.
//!
//! Configuration is stored as TOML, by default in
//! `<config dir>/histsync/config.toml`, and includes:
//! - `[paths]`: local history, git working copy, PID and log files
//! - `[settings]`: sync interval and transport selector
//! - `[git]` / `[ssh]`: transport-specific settings
//!
//! Local paths may start with `~/`. Relative local paths are resolved
//! against the git working copy directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "histsync";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub settings: SettingsConfig,
    pub git: GitConfig,
    pub ssh: SshConfig,
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// The shell's history file.
    pub local_history: String,
    /// Remote file path for the ssh transport, relative to the remote home.
    pub remote_history: String,
    /// Local working copy for the git transport.
    pub git_repo: String,
    pub log_file: String,
    pub pid_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            local_history: "~/.zsh_history".to_string(),
            remote_history: "histsync/history.txt".to_string(),
            git_repo: "~/.zsh_history_git".to_string(),
            log_file: "~/.histsync/histsync.log".to_string(),
            pid_file: "~/.histsync/histsync.pid".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Seconds between reconciliation cycles.
    pub sync_interval_seconds: u64,
    pub sync_type: SyncType,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        SettingsConfig {
            sync_interval_seconds: 3600,
            sync_type: SyncType::Git,
        }
    }
}

/// Transport used to reach the shared history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    #[default]
    Git,
    Ssh,
    Memory,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncType::Git => "git",
            SyncType::Ssh => "ssh",
            SyncType::Memory => "memory",
        }
    }
}

impl fmt::Display for SyncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SyncType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "git" => Ok(SyncType::Git),
            "ssh" => Ok(SyncType::Ssh),
            "memory" => Ok(SyncType::Memory),
            other => Err(Error::UnknownSyncType(other.to_string())),
        }
    }
}

/// Git transport settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote URL. Empty means a local-only repository.
    pub repository_url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_remote_name")]
    pub remote_name: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_remote_name() -> String {
    "origin".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            repository_url: String::new(),
            branch: default_branch(),
            remote_name: default_remote_name(),
        }
    }
}

impl GitConfig {
    /// The remote URL, if one is configured.
    pub fn url(&self) -> Option<&str> {
        let url = self.repository_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// SSH transport settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    pub host: String,
    /// Remote login. Empty uses the ssh client's default.
    pub username: String,
    pub port: u16,
    /// Advisory lock marker on the remote host.
    pub lock_file: String,
}

impl Default for SshConfig {
    fn default() -> Self {
        SshConfig {
            host: String::new(),
            username: String::new(),
            port: 22,
            lock_file: "histsync.lock".to_string(),
        }
    }
}

impl SshConfig {
    /// `user@host`, or just `host` when no user is set.
    pub fn destination(&self) -> String {
        if self.username.is_empty() {
            self.host.clone()
        } else {
            format!("{}@{}", self.username, self.host)
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parses and validates a TOML document.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration, writing a default file first if none exists.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("creating default config at {}", path.display());
            Config::default().save(path)?;
        }
        Self::load(path)
    }

    /// Saves configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = self.to_toml()?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }

    /// Rejects settings that cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.settings.sync_interval_seconds == 0 {
            return Err(Error::Config(
                "settings.sync_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.settings.sync_type == SyncType::Ssh && self.ssh.host.trim().is_empty() {
            return Err(Error::Config(
                "ssh.host is required when settings.sync_type = \"ssh\"".to_string(),
            ));
        }
        if self.git.branch.trim().is_empty() || self.git.remote_name.trim().is_empty() {
            return Err(Error::Config(
                "git.branch and git.remote_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.settings.sync_interval_seconds)
    }

    pub fn git_repo_path(&self) -> PathBuf {
        expand_home(&self.paths.git_repo)
    }

    pub fn local_history_path(&self) -> PathBuf {
        self.resolve(&self.paths.local_history)
    }

    pub fn pid_file_path(&self) -> PathBuf {
        self.resolve(&self.paths.pid_file)
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.resolve(&self.paths.log_file)
    }

    /// Expands `~` and anchors relative paths at the git working copy.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let expanded = expand_home(path);
        if expanded.is_absolute() {
            expanded
        } else {
            self.git_repo_path().join(expanded)
        }
    }
}

/// Replaces a leading `~` with the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
