//! Logger metrics for observability
//!
//! Counters for the write path and the background maintenance loops.
//! Failures on the background threads have no caller to return an error
//! to, so these counters are how an application notices them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_rotating_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_written();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.lines_written(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records appended to the active file
    lines_written: AtomicU64,

    /// Records that passed the level filter but could not be written
    dropped_count: AtomicU64,

    /// Day-boundary rotations that renamed a file
    rotations: AtomicU64,

    /// Day-boundary rotations skipped because the file was empty
    empty_rotations: AtomicU64,

    /// Rotations whose rename or compression failed
    rotation_failures: AtomicU64,

    /// Times the sync loop recreated a vanished file
    files_recreated: AtomicU64,

    /// Periodic syncs that failed
    sync_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            lines_written: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            empty_rotations: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            files_recreated: AtomicU64::new(0),
            sync_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn empty_rotations(&self) -> u64 {
        self.empty_rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_failures(&self) -> u64 {
        self.rotation_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn files_recreated(&self) -> u64 {
        self.files_recreated.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sync_failures(&self) -> u64 {
        self.sync_failures.load(Ordering::Relaxed)
    }

    /// Record a written line. Returns the previous count.
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.lines_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_empty_rotation(&self) -> u64 {
        self.empty_rotations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation_failure(&self) -> u64 {
        self.rotation_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_file_recreated(&self) -> u64 {
        self.files_recreated.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sync_failure(&self) -> u64 {
        self.sync_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been logged.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.lines_written() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.lines_written.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.rotations.store(0, Ordering::Relaxed);
        self.empty_rotations.store(0, Ordering::Relaxed);
        self.rotation_failures.store(0, Ordering::Relaxed);
        self.files_recreated.store(0, Ordering::Relaxed);
        self.sync_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            lines_written: AtomicU64::new(self.lines_written()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            rotations: AtomicU64::new(self.rotations()),
            empty_rotations: AtomicU64::new(self.empty_rotations()),
            rotation_failures: AtomicU64::new(self.rotation_failures()),
            files_recreated: AtomicU64::new(self.files_recreated()),
            sync_failures: AtomicU64::new(self.sync_failures()),
        }
    }
}
