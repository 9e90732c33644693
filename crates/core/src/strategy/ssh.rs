// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SSH-backed transport.
//!
//! The shared history is a plain file on a remote host, read with `cat` and
//! replaced with `scp`. Clearing is guarded by an advisory lock file on the
//! remote host. All remote access goes through [`RemoteShell`].

use std::cell::Cell;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;

use crate::config::Config;
use crate::error::{mentions_permission, Error, Result};
use crate::history::{decode_text, HistoryLog};
use crate::merge::merge;
use crate::retry::{retry_transient, DEFAULT_ATTEMPTS};

use super::SyncStrategy;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Remote command execution and file upload.
pub trait RemoteShell {
    /// Runs a shell command on the remote host.
    fn exec(&self, command: &str) -> Result<ShellOutput>;

    /// Copies a local file to `remote_path` on the remote host.
    fn upload(&self, local: &Path, remote_path: &str) -> Result<ShellOutput>;
}

/// [`RemoteShell`] over the system `ssh` and `scp` clients.
///
/// Both run in batch mode, so a missing key fails instead of prompting.
#[derive(Debug, Clone)]
pub struct OpenSsh {
    destination: String,
    port: u16,
    command_timeout: Duration,
}

impl OpenSsh {
    pub fn new(destination: impl Into<String>, port: u16) -> Self {
        OpenSsh {
            destination: destination.into(),
            port,
            command_timeout: COMMAND_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ssh.destination(), config.ssh.port)
    }

    fn common_options() -> Vec<String> {
        vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", CONNECT_TIMEOUT.as_secs()),
        ]
    }

    /// `destination:path`, with the path quoted for the remote shell.
    fn scp_target(&self, remote_path: &str) -> String {
        format!("{}:{}", self.destination, shell_quote(remote_path))
    }
}

impl RemoteShell for OpenSsh {
    fn exec(&self, command: &str) -> Result<ShellOutput> {
        let mut cmd = Command::new("ssh");
        cmd.args(Self::common_options())
            .arg("-p")
            .arg(self.port.to_string())
            .arg(&self.destination)
            .arg(command);
        run_with_timeout(cmd, command, self.command_timeout)
    }

    fn upload(&self, local: &Path, remote_path: &str) -> Result<ShellOutput> {
        let target = self.scp_target(remote_path);
        let mut cmd = Command::new("scp");
        // Legacy protocol: the remote shell expands the target, as with `exec`.
        cmd.args(["-q", "-O"])
            .args(Self::common_options())
            .arg("-P")
            .arg(self.port.to_string())
            .arg(local)
            .arg(&target);
        run_with_timeout(cmd, &format!("scp {target}"), self.command_timeout)
    }
}

/// Runs a local command, killing it if it outlives `timeout`.
pub(crate) fn run_with_timeout(
    mut cmd: Command,
    label: &str,
    timeout: Duration,
) -> Result<ShellOutput> {
    tracing::trace!("running {}", label);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn()?;

    // Drain both pipes while waiting so a chatty child cannot block.
    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                command: label.to_string(),
                secs: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(ShellOutput {
        status: status.code(),
        stdout: decode_text(collect(stdout)),
        stderr: String::from_utf8_lossy(&collect(stderr)).into_owned(),
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Remote locations used by the ssh transport.
#[derive(Debug, Clone)]
pub struct SshSettings {
    /// History file, relative to the remote home unless absolute.
    pub remote_path: String,
    /// Lock marker, relative to the remote home unless absolute.
    pub lock_path: String,
    pub attempts: u32,
}

impl SshSettings {
    pub fn from_config(config: &Config) -> Self {
        SshSettings {
            remote_path: remote_path(&config.paths.remote_history),
            lock_path: remote_path(&config.ssh.lock_file),
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

pub struct SshStrategy<S: RemoteShell> {
    settings: SshSettings,
    shell: S,
    /// Set when we created the lock but could not remove it.
    lock_pending: Cell<bool>,
}

impl<S: RemoteShell> SshStrategy<S> {
    pub fn new(settings: SshSettings, shell: S) -> Self {
        SshStrategy {
            settings,
            shell,
            lock_pending: Cell::new(false),
        }
    }

    /// Runs a remote command, turning a non-zero exit into an error.
    fn exec_checked(&self, command: &str) -> Result<ShellOutput> {
        let output = self.shell.exec(command)?;
        check(command, output)
    }

    /// Removes a lock this process created but failed to release.
    fn release_pending_lock(&self) {
        if !self.lock_pending.get() {
            return;
        }
        let release = format!("rm -f {}", shell_quote(&self.settings.lock_path));
        match self.exec_checked(&release) {
            Ok(_) => self.lock_pending.set(false),
            Err(e) => tracing::warn!("lock {} still held: {}", self.settings.lock_path, e),
        }
    }

    fn clear_once(&self) -> Result<bool> {
        self.release_pending_lock();

        let lock = shell_quote(&self.settings.lock_path);
        let probe_cmd = format!("test -f {lock}");
        let probe = self.shell.exec(&probe_cmd)?;
        if probe.success() {
            return Ok(false);
        }
        // Anything but "absent" means the probe itself failed.
        if probe.status != Some(1) {
            return check(&probe_cmd, probe).map(|_| false);
        }

        self.exec_checked(&format!("touch {lock}"))?;
        let _lock = RemoteLock {
            shell: &self.shell,
            release: format!("rm -f {lock}"),
            pending: &self.lock_pending,
        };

        let path = shell_quote(&self.settings.remote_path);
        self.exec_checked(&format!("test ! -e {path} || : > {path}"))?;
        Ok(true)
    }
}

impl<S: RemoteShell> SyncStrategy for SshStrategy<S> {
    fn read_remote_history(&mut self) -> Result<HistoryLog> {
        let command = format!("cat {}", shell_quote(&self.settings.remote_path));
        let output = self.shell.exec(&command)?;
        if output.success() {
            return Ok(HistoryLog::parse(&output.stdout));
        }
        if output.stderr.contains("No such file") {
            tracing::debug!("{} does not exist yet", self.settings.remote_path);
            return Ok(HistoryLog::new());
        }
        check(&command, output).map(|_| HistoryLog::new())
    }

    fn write_remote_history(&mut self, history: &HistoryLog) -> Result<()> {
        let current = self.read_remote_history()?;
        let merged = merge(&current, history);

        // Removed on drop, whichever way this function exits.
        let mut staged = NamedTempFile::new()?;
        staged.write_all(merged.to_text().as_bytes())?;
        staged.flush()?;

        if let Some(parent) = remote_parent(&self.settings.remote_path) {
            self.exec_checked(&format!("mkdir -p {}", shell_quote(parent)))?;
        }
        let upload = self
            .shell
            .upload(staged.path(), &self.settings.remote_path)?;
        check(&format!("scp {}", self.settings.remote_path), upload)?;
        tracing::debug!("uploaded {} entries", merged.len());
        Ok(())
    }

    fn clear_remote_history(&mut self) -> bool {
        match retry_transient(self.settings.attempts, || self.clear_once()) {
            Ok(true) => {
                tracing::info!("remote history cleared");
                true
            }
            Ok(false) => {
                tracing::warn!(
                    "lock {} is held by another host, not clearing",
                    self.settings.lock_path
                );
                false
            }
            Err(e) => {
                tracing::error!("failed to clear remote history: {}", e);
                false
            }
        }
    }

    fn cleanup(&mut self) {
        self.release_pending_lock();
    }
}

/// A held remote lock, released on drop.
struct RemoteLock<'a, S: RemoteShell> {
    shell: &'a S,
    release: String,
    pending: &'a Cell<bool>,
}

impl<S: RemoteShell> Drop for RemoteLock<'_, S> {
    fn drop(&mut self) {
        let released = self
            .shell
            .exec(&self.release)
            .and_then(|out| check(&self.release, out));
        match released {
            Ok(_) => self.pending.set(false),
            Err(e) => {
                tracing::warn!("failed to release remote lock: {}", e);
                self.pending.set(true);
            }
        }
    }
}

fn check(command: &str, output: ShellOutput) -> Result<ShellOutput> {
    if output.success() {
        return Ok(output);
    }
    let stderr = output.stderr.trim().to_string();
    if mentions_permission(&stderr) {
        return Err(Error::PermissionDenied(format!("{command}: {stderr}")));
    }
    Err(Error::Ssh {
        command: command.to_string(),
        stderr,
    })
}

/// Remote commands start in the home directory, so `~/` is dropped.
fn remote_path(path: &str) -> String {
    path.strip_prefix("~/").unwrap_or(path).to_string()
}

fn remote_parent(path: &str) -> Option<&str> {
    Path::new(path)
        .parent()
        .and_then(|p| p.to_str())
        .filter(|p| !p.is_empty())
}

/// Quotes a word for a POSIX shell.
fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
