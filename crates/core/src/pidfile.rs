// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Singleton registration through a PID file.
//!
//! The registration itself is an exclusive `flock` on a lock file next to the
//! PID file (`<pid file>.lock`). The lock file is never removed, so every
//! contender locks the same inode. The PID file only records which process
//! holds the lock; it is written atomically once the lock is taken, and is
//! trusted only while the lock is held.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// How long `stop` waits for the daemon to exit.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a lock holder may take to record its PID.
const PID_WAIT: Duration = Duration::from_secs(1);

/// Attempts at taking the lock, to ride out a concurrent status probe.
const LOCK_ATTEMPTS: u32 = 3;

/// Path of the lock file guarding `pid_path`.
pub fn lock_path(pid_path: &Path) -> PathBuf {
    let mut name = pid_path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    pid_path.with_file_name(name)
}

/// Reads the PID from a PID file.
pub fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|&pid| pid > 0)
}

/// Returns true if a process with this id exists.
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        // Exists, but belongs to another user.
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

fn open_lock(pid_path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path(pid_path))
}

/// Returns the PID of the live registered daemon, if any.
///
/// Only a held lock counts as a registration. A PID file without a lock
/// holder is stale and is removed while the lock is briefly held here, so a
/// daemon registering at the same moment cannot lose its file.
pub fn detect_running(path: &Path) -> Option<u32> {
    if !path.exists() && !lock_path(path).exists() {
        return None;
    }
    let Ok(lock) = open_lock(path) else {
        return None;
    };
    if lock.try_lock_exclusive().is_err() {
        return wait_for_pid(path);
    }

    if path.exists() {
        tracing::info!("removing stale pid file {}", path.display());
        let _ = fs::remove_file(path);
    }
    let _ = FileExt::unlock(&lock);
    None
}

/// Waits for a lock holder to record a live PID.
fn wait_for_pid(path: &Path) -> Option<u32> {
    let start = Instant::now();
    loop {
        if let Some(pid) = read_pid(path).filter(|&pid| is_process_alive(pid)) {
            return Some(pid);
        }
        if start.elapsed() >= PID_WAIT {
            tracing::warn!("{} is locked but names no live process", path.display());
            return None;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// A held PID registration. The PID file is removed and the lock released
/// when this is dropped.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
    lock: Option<File>,
}

impl PidFile {
    /// Registers the current process.
    ///
    /// Fails with [`Error::AlreadyRunning`] if another holder has the lock;
    /// that holder and its files are left untouched.
    pub fn acquire(path: &Path) -> Result<Self> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let lock = open_lock(path)?;
        let mut attempt = 1;
        while lock.try_lock_exclusive().is_err() {
            if attempt >= LOCK_ATTEMPTS {
                return Err(Error::AlreadyRunning(wait_for_pid(path).unwrap_or(0)));
            }
            attempt += 1;
            std::thread::sleep(POLL_INTERVAL);
        }

        let pid = std::process::id();
        let mut staged = NamedTempFile::new_in(parent)?;
        write!(staged, "{}", pid)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| e.error)?;

        tracing::debug!("registered pid {} in {}", pid, path.display());
        Ok(PidFile {
            path: path.to_path_buf(),
            lock: Some(lock),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the registration now instead of on drop.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(lock) = self.lock.take() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!("failed to remove pid file {}: {}", self.path.display(), e);
            }
            let _ = FileExt::unlock(&lock);
        }
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Stops the registered daemon.
///
/// Sends SIGTERM to the lock holder and polls until it exits, up to
/// `timeout`. A PID file nobody holds the lock for is never signalled. The
/// PID file is removed once the exit is confirmed. Returns the stopped PID.
pub fn stop(path: &Path, timeout: Duration) -> Result<u32> {
    let pid = detect_running(path).ok_or(Error::NotRunning)?;
    let raw = i32::try_from(pid).map_err(|_| Error::NotRunning)?;

    tracing::info!("sending SIGTERM to {}", pid);
    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => {}
        Err(Errno::ESRCH) => {
            let _ = fs::remove_file(path);
            return Ok(pid);
        }
        Err(e) => return Err(Error::Io(std::io::Error::from(e))),
    }

    if !wait_for_exit(pid, timeout) {
        return Err(Error::StopTimeout {
            pid,
            secs: timeout.as_secs(),
        });
    }

    // The daemon normally removes its own file; make sure it is gone.
    if read_pid(path) == Some(pid) {
        let _ = fs::remove_file(path);
    }
    Ok(pid)
}

/// Polls until `pid` exits. Returns false on timeout.
fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        if !is_process_alive(pid) {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
