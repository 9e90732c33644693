// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::config::SyncType;
use crate::error::Error;
use crate::history::HistoryLog;
use crate::strategy::MemoryStrategy;
use std::sync::atomic::AtomicUsize;
use tempfile::TempDir;

fn config(temp: &TempDir) -> Config {
    let mut config = Config::default();
    config.settings.sync_type = SyncType::Memory;
    config.paths.local_history = path(temp, "zsh_history");
    config.paths.pid_file = path(temp, "histsync.pid");
    config.paths.git_repo = path(temp, "repo");
    config
}

fn path(temp: &TempDir, name: &str) -> String {
    temp.path().join(name).to_string_lossy().into_owned()
}

/// Counts calls and raises the shutdown flag after a number of cycles.
struct Probe {
    inner: MemoryStrategy,
    shutdown: Arc<AtomicBool>,
    stop_after: usize,
    reads: Arc<AtomicUsize>,
    cleanups: Arc<AtomicUsize>,
    fail_reads: bool,
}

impl Probe {
    fn new(shutdown: &Arc<AtomicBool>, stop_after: usize) -> Self {
        Probe {
            inner: MemoryStrategy::with_history(HistoryLog::parse(": 1:0;remote\n")),
            shutdown: Arc::clone(shutdown),
            stop_after,
            reads: Arc::new(AtomicUsize::new(0)),
            cleanups: Arc::new(AtomicUsize::new(0)),
            fail_reads: false,
        }
    }
}

impl SyncStrategy for Probe {
    fn read_remote_history(&mut self) -> Result<HistoryLog> {
        let reads = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if reads >= self.stop_after {
            self.shutdown.store(true, Ordering::SeqCst);
        }
        if self.fail_reads {
            return Err(Error::Timeout {
                command: "cat history".to_string(),
                secs: 10,
            });
        }
        self.inner.read_remote_history()
    }

    fn write_remote_history(&mut self, history: &HistoryLog) -> Result<()> {
        self.inner.write_remote_history(history)
    }

    fn clear_remote_history(&mut self) -> bool {
        self.inner.clear_remote_history()
    }

    fn cleanup(&mut self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn runs_until_shutdown_then_cleans_up() {
    let temp = TempDir::new().unwrap();
    let shutdown = Arc::new(AtomicBool::new(false));
    let probe = Probe::new(&shutdown, 1);
    let cleanups = Arc::clone(&probe.cleanups);
    let pid_path = temp.path().join("histsync.pid");
    let mut ready_pid = None;

    let mut controller = Controller::new(config(&temp), Arc::clone(&shutdown));
    controller
        .run_with(
            |_| Ok(probe),
            || ready_pid = crate::pidfile::read_pid(&pid_path),
        )
        .unwrap();

    assert_eq!(ready_pid, Some(std::process::id()));
    assert_eq!(controller.cycles(), 1);
    assert_eq!(controller.state(), DaemonState::Stopped);
    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    assert!(!pid_path.exists());
    assert_eq!(
        std::fs::read_to_string(temp.path().join("zsh_history")).unwrap(),
        ": 1:0;remote\n"
    );
}

#[test]
fn failing_cycles_do_not_stop_the_loop() {
    let temp = TempDir::new().unwrap();
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut probe = Probe::new(&shutdown, 3);
    probe.fail_reads = true;
    let reads = Arc::clone(&probe.reads);

    let mut controller = Controller::new(config(&temp), Arc::clone(&shutdown))
        .with_interval(Duration::from_millis(10));
    controller.run_with(|_| Ok(probe), || {}).unwrap();

    assert_eq!(reads.load(Ordering::SeqCst), 3);
    assert_eq!(controller.cycles(), 3);
}

#[test]
fn live_holder_refuses_second_instance() {
    let temp = TempDir::new().unwrap();
    let pid_path = temp.path().join("histsync.pid");
    // This test process holds the registration, standing in for a daemon.
    let _holder = crate::pidfile::PidFile::acquire(&pid_path).unwrap();
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut built = false;
    let mut ready = false;

    let mut controller = Controller::new(config(&temp), shutdown);
    let result = controller.run_with(
        |_| {
            built = true;
            Ok(MemoryStrategy::new())
        },
        || ready = true,
    );

    assert!(matches!(result, Err(Error::AlreadyRunning(pid)) if pid == std::process::id()));
    assert!(!built);
    assert!(!ready);
    assert_eq!(controller.cycles(), 0);
    assert_eq!(
        std::fs::read_to_string(&pid_path).unwrap(),
        std::process::id().to_string()
    );
}

#[test]
fn failed_transport_releases_registration() {
    let temp = TempDir::new().unwrap();
    let shutdown = Arc::new(AtomicBool::new(false));

    let mut controller = Controller::new(config(&temp), shutdown);
    let result = controller.run_with(
        |_| -> Result<MemoryStrategy> { Err(Error::PermissionDenied("repo".to_string())) },
        || {},
    );

    assert!(matches!(result, Err(Error::PermissionDenied(_))));
    assert!(!temp.path().join("histsync.pid").exists());
    assert_eq!(controller.state(), DaemonState::Stopped);
}

#[test]
fn raised_flag_interrupts_sleep() {
    let temp = TempDir::new().unwrap();
    let shutdown = Arc::new(AtomicBool::new(false));
    let probe = Probe::new(&shutdown, usize::MAX);
    let flag = Arc::clone(&shutdown);
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(300));
        flag.store(true, Ordering::SeqCst);
    });

    let start = Instant::now();
    let mut controller = Controller::new(config(&temp), shutdown);
    controller.run_with(|_| Ok(probe), || {}).unwrap();
    stopper.join().unwrap();

    // The configured interval is an hour.
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(controller.cycles(), 1);
}

#[test]
fn configured_transport_runs() {
    let temp = TempDir::new().unwrap();
    let shutdown = Arc::new(AtomicBool::new(true));

    let mut controller = Controller::new(config(&temp), shutdown);
    controller.run(|| {}).unwrap();

    assert_eq!(controller.cycles(), 0);
    assert_eq!(controller.state(), DaemonState::Stopped);
}

#[test]
fn state_names() {
    assert_eq!(DaemonState::Running.to_string(), "running");
    assert_eq!(DaemonState::Stopping.to_string(), "stopping");
}
