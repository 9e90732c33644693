// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background reconciliation loop.
//!
//! The controller registers itself through the PID file, builds the
//! configured transport and runs one reconciliation cycle per interval until
//! the shutdown flag is raised. SIGTERM and SIGINT raise the flag.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use signal_hook::consts::{SIGINT, SIGTERM};

use crate::config::Config;
use crate::error::Result;
use crate::pidfile::PidFile;
use crate::strategy::{Strategy, SyncStrategy};
use crate::sync::sync_history;

/// Granularity at which the inter-cycle sleep checks for shutdown.
const SLEEP_SLICE: Duration = Duration::from_millis(250);

/// Lifecycle of a [`Controller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl fmt::Display for DaemonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DaemonState::Stopped => "stopped",
            DaemonState::Starting => "starting",
            DaemonState::Running => "running",
            DaemonState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// Raises the returned flag on SIGTERM or SIGINT.
pub fn install_signal_handlers() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGTERM, Arc::clone(&shutdown))?;
    signal_hook::flag::register(SIGINT, Arc::clone(&shutdown))?;
    Ok(shutdown)
}

pub struct Controller {
    config: Config,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    state: DaemonState,
    cycles: u64,
}

impl Controller {
    pub fn new(config: Config, shutdown: Arc<AtomicBool>) -> Self {
        let interval = config.sync_interval();
        Controller {
            config,
            interval,
            shutdown,
            state: DaemonState::Stopped,
            cycles: 0,
        }
    }

    /// Overrides the configured interval between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    /// Cycles attempted so far, successful or not.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Runs with the transport selected by the configuration.
    ///
    /// `on_ready` is called once the PID file is held and the transport is
    /// prepared. Returns when the shutdown flag is raised.
    pub fn run(&mut self, on_ready: impl FnOnce()) -> Result<()> {
        self.run_with(Strategy::from_config, on_ready)
    }

    /// Like [`Controller::run`], with a caller-supplied transport.
    ///
    /// `build` is only called after the PID file has been acquired, so a
    /// refused start never touches the shared history.
    pub fn run_with<S, B>(&mut self, build: B, on_ready: impl FnOnce()) -> Result<()>
    where
        S: SyncStrategy,
        B: FnOnce(&Config) -> Result<S>,
    {
        self.transition(DaemonState::Starting);
        let pid_file = match PidFile::acquire(&self.config.pid_file_path()) {
            Ok(pid_file) => pid_file,
            Err(e) => {
                self.transition(DaemonState::Stopped);
                return Err(e);
            }
        };
        let mut strategy = match build(&self.config) {
            Ok(strategy) => strategy,
            Err(e) => {
                tracing::error!("failed to prepare transport: {}", e);
                self.transition(DaemonState::Stopped);
                pid_file.release();
                return Err(e);
            }
        };

        self.transition(DaemonState::Running);
        on_ready();
        self.run_loop(&mut strategy);

        self.transition(DaemonState::Stopping);
        strategy.cleanup();
        pid_file.release();
        self.transition(DaemonState::Stopped);
        Ok(())
    }

    fn run_loop<S: SyncStrategy>(&mut self, strategy: &mut S) {
        let local_path = self.config.local_history_path();
        tracing::info!(
            "syncing {} every {}s",
            local_path.display(),
            self.interval.as_secs()
        );

        while !self.shutdown_requested() {
            self.cycles += 1;
            match sync_history(strategy, &local_path) {
                Ok(report) => tracing::debug!("cycle {} done: {:?}", self.cycles, report),
                Err(e) => tracing::error!("cycle {} failed: {}", self.cycles, e),
            }
            self.sleep();
        }
        tracing::info!("shutdown requested");
    }

    /// Sleeps for the interval, waking early on shutdown.
    fn sleep(&self) {
        let deadline = Instant::now() + self.interval;
        while !self.shutdown_requested() {
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            std::thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    fn transition(&mut self, next: DaemonState) {
        tracing::info!("daemon {} -> {}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
