//! The sync loop can not recreate the log file
//!
//! The log directory is removed and a regular file takes its place, so
//! the directory can not be recreated. Under `FatalAction::Exit` the
//! process terminates with status 1; under `FatalAction::Continue` the
//! failure is returned and counted, and the file comes back once the
//! obstruction is gone.

#![cfg(unix)]

use rust_rotating_logger::{FatalAction, LevelMask, Logger, FATAL_EXIT_CODE};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const CHILD_DIR: &str = "ROTATING_LOGGER_SYNC_CHILD_DIR";

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    condition()
}

fn block_log_dir(log_dir: &Path) {
    fs::remove_dir_all(log_dir).expect("Failed to remove log dir");
    fs::write(log_dir, b"not a directory").expect("Failed to create blocking file");
}

#[test]
fn test_unrecoverable_recreate_exits() {
    if let Ok(dir) = std::env::var(CHILD_DIR) {
        let log_dir = Path::new(&dir).join("logs");
        let logger = Logger::builder(log_dir.join("app.log"))
            .level(LevelMask::ALL)
            .sync_interval(Duration::from_millis(50))
            .build()
            .expect("Failed to create logger");
        logger.info("before the directory vanished");

        block_log_dir(&log_dir);

        // The sync thread ends the process; returning normally fails the parent.
        std::thread::sleep(Duration::from_secs(10));
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let status = Command::new(std::env::current_exe().expect("No test binary path"))
        .args(["test_unrecoverable_recreate_exits", "--exact", "--nocapture"])
        .env(CHILD_DIR, temp_dir.path())
        .status()
        .expect("Failed to run child process");

    assert_eq!(status.code(), Some(FATAL_EXIT_CODE));
    assert!(temp_dir.path().join("logs").is_file());
}

#[test]
fn test_recreate_failure_is_reported_under_continue() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_dir = temp_dir.path().join("logs");
    let log_file = log_dir.join("app.log");

    let logger = Logger::builder(&log_file)
        .sync_interval(Duration::from_millis(50))
        .stack_trace(LevelMask::NONE)
        .on_fatal(FatalAction::Continue)
        .build()
        .expect("Failed to create logger");
    logger.info("first");

    block_log_dir(&log_dir);

    assert!(logger.sync().is_err());
    assert!(wait_until(Duration::from_secs(5), || logger.metrics().sync_failures() >= 1));
    assert!(!logger.is_closed());

    let dropped = logger.metrics().dropped_count();
    logger.info("lost while blocked");
    assert_eq!(logger.metrics().dropped_count(), dropped + 1);

    fs::remove_file(&log_dir).expect("Failed to remove blocking file");
    assert!(wait_until(Duration::from_secs(5), || logger.sync().is_ok() && log_file.exists()));

    logger.info("recovered");
    logger.close().expect("Failed to close");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" INFO recovered"));
}
