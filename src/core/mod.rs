//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod stack_annotation;
pub mod timestamp;
mod worker;

pub use appender::Appender;
pub use config::LoggerConfig;
pub use error::{LoggerError, Result};
pub use log_entry::LogEntry;
pub use log_level::{should_write, LevelMask, LogLevel};
pub use logger::{
    FatalAction, Logger, LoggerBuilder, DEFAULT_STACK_TRACE, DEFAULT_TIME_SYNC, FATAL_EXIT_CODE,
};
pub use metrics::LoggerMetrics;
pub use stack_annotation::{caller_annotation, CallerFrame, DEFAULT_MAX_DEPTH, UNKNOWN_CALLER};
pub use timestamp::TimestampFormat;
