//! Logging macros for ergonomic log message formatting.
//!
//! Each macro checks nothing itself: it hands `format_args!` to
//! [`Logger::printf`](crate::Logger::printf), which filters by level before
//! the message is rendered.
//!
//! # Examples
//!
//! ```no_run
//! use rust_rotating_logger::prelude::*;
//! use rust_rotating_logger::info;
//!
//! let logger = Logger::new("logs/app.log", LevelMask::ALL, false)?;
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! # Ok::<(), LoggerError>(())
//! ```

/// Log a formatted message at an explicit level.
///
/// ```no_run
/// # use rust_rotating_logger::prelude::*;
/// # let logger = Logger::new("app.log", LevelMask::ALL, false)?;
/// use rust_rotating_logger::logf;
/// logf!(logger, LogLevel::Info, "Simple message");
/// logf!(logger, LogLevel::Error, "Error code: {}", 500);
/// # Ok::<(), LoggerError>(())
/// ```
#[macro_export]
macro_rules! logf {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.printf($level, ::std::format_args!($($arg)+))
    };
}

/// Log an access record. Access lines carry no severity label.
#[macro_export]
macro_rules! access {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Access, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal message. The logger's [`FatalAction`](crate::FatalAction)
/// decides whether the process exits afterwards.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{FatalAction, LevelMask, LogLevel, Logger};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_level_macros() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("macros.log");
        let logger = Logger::builder(&path)
            .stack_trace(LevelMask::NONE)
            .build()
            .unwrap();

        logf!(logger, LogLevel::Info, "Formatted: {}", 42);
        access!(logger, "GET /health {}", 200);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        logger.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].ends_with(" INFO Formatted: 42"));
        assert!(lines[1].ends_with(" GET /health 200"));
        assert!(!lines[1].contains("ACCESS"));
        assert!(lines[2].ends_with(" DEBUG Count: 5"));
        assert!(lines[3].ends_with(" INFO Items: 100"));
        assert!(lines[4].ends_with(" WARN Retry 1 of 3"));
        assert!(lines[5].ends_with(" ERROR Code: 500"));
    }

    #[test]
    fn test_fatal_macro_with_continue() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fatal.log");
        let logger = Logger::builder(&path)
            .on_fatal(FatalAction::Continue)
            .build()
            .unwrap();

        fatal!(logger, "Critical failure: {}", "system");

        assert!(logger.is_closed());
        assert!(fs::read_to_string(&path)
            .unwrap()
            .ends_with(" FATAL Critical failure: system\n"));
    }

    #[test]
    fn test_filtered_macro_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("filtered.log");
        let logger = Logger::new(&path, LogLevel::Error, false).unwrap();

        debug!(logger, "hidden {}", 1);
        logger.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
