//! # Rust Rotating Logger
//!
//! A leveled file logger that keeps one log file per process healthy on its
//! own: records are filtered by a severity bitmask, optionally annotated with
//! the calling function, and appended to a single file that a background
//! thread syncs to disk every second and recreates if it disappears. With
//! rotation enabled the file is renamed at each day boundary and compressed
//! with gzip or zip.
//!
//! ## Example
//!
//! ```no_run
//! use rust_rotating_logger::prelude::*;
//! use rust_rotating_logger::info;
//!
//! let logger = Logger::new("logs/app.log", LevelMask::PRODUCTION, true)?;
//! logger.set_compress_mode_zip();
//!
//! info!(logger, "listening on {}", "0.0.0.0:8080");
//! logger.println(LogLevel::Error, &[&"upstream", &"timed out"]);
//!
//! logger.close()?;
//! # Ok::<(), LoggerError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{CompressMode, RotationOutcome};
    pub use crate::core::{
        Appender, FatalAction, LevelMask, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, Result, TimestampFormat,
    };
}

pub use appenders::{CompressMode, LogFile, RotationOutcome};
pub use core::{
    caller_annotation, should_write, Appender, FatalAction, LevelMask, LogEntry, LogLevel, Logger,
    LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, Result, TimestampFormat,
    DEFAULT_MAX_DEPTH, FATAL_EXIT_CODE,
};
