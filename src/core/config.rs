//! Declarative logger configuration
//!
//! A [`LoggerConfig`] can be loaded from JSON and turned into a
//! [`LoggerBuilder`]. Only `path` is required:
//!
//! ```json
//! {
//!   "path": "/var/log/app/app.log",
//!   "level": "LEVEL_PRODUCTION",
//!   "rotate": true,
//!   "compress": "zip",
//!   "sync_interval_ms": 500
//! }
//! ```

use super::error::{LoggerError, Result};
use super::log_level::LevelMask;
use super::logger::{FatalAction, Logger, LoggerBuilder, DEFAULT_STACK_TRACE, DEFAULT_TIME_SYNC};
use super::stack_annotation::DEFAULT_MAX_DEPTH;
use super::timestamp::TimestampFormat;
use crate::appenders::compression::CompressMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub path: PathBuf,

    #[serde(default = "default_level")]
    pub level: LevelMask,

    #[serde(default)]
    pub rotate: bool,

    #[serde(default)]
    pub compress: CompressMode,

    /// Sync loop interval; zero keeps the default
    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,

    #[serde(default = "default_stack_trace")]
    pub stack_trace: LevelMask,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub timestamp_format: TimestampFormat,

    #[serde(default)]
    pub on_fatal: FatalAction,
}

fn default_level() -> LevelMask {
    LevelMask::ALL
}

fn default_sync_interval_ms() -> u64 {
    DEFAULT_TIME_SYNC.as_millis() as u64
}

fn default_stack_trace() -> LevelMask {
    DEFAULT_STACK_TRACE
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl LoggerConfig {
    /// Configuration with every default for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            level: default_level(),
            rotate: false,
            compress: CompressMode::default(),
            sync_interval_ms: default_sync_interval_ms(),
            stack_trace: default_stack_trace(),
            max_depth: default_max_depth(),
            timestamp_format: TimestampFormat::default(),
            on_fatal: FatalAction::default(),
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.timestamp_format.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                format!("reading logger config {}", path.display()),
                e.to_string(),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn into_builder(self) -> LoggerBuilder {
        Logger::builder(self.path)
            .level(self.level)
            .rotation(self.rotate)
            .compress_mode(self.compress)
            .sync_interval(Duration::from_millis(self.sync_interval_ms))
            .stack_trace(self.stack_trace)
            .max_depth(self.max_depth)
            .timestamp_format(self.timestamp_format)
            .on_fatal(self.on_fatal)
    }

    pub fn build(self) -> Result<Logger> {
        self.into_builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config = LoggerConfig::from_json_str(r#"{ "path": "logs/app.log" }"#).unwrap();
        assert_eq!(config, LoggerConfig::new("logs/app.log"));
    }

    #[test]
    fn test_full_json() {
        let config = LoggerConfig::from_json_str(
            r#"{
                "path": "logs/app.log",
                "level": "ERROR|INFO",
                "rotate": true,
                "compress": "zip",
                "sync_interval_ms": 250,
                "stack_trace": "NONE",
                "max_depth": 4,
                "timestamp_format": "Rfc3339",
                "on_fatal": "continue"
            }"#,
        )
        .unwrap();

        assert_eq!(config.level, LogLevel::Error | LogLevel::Info);
        assert!(config.rotate);
        assert_eq!(config.compress, CompressMode::Zip);
        assert_eq!(config.sync_interval_ms, 250);
        assert_eq!(config.stack_trace, LevelMask::NONE);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.timestamp_format, TimestampFormat::Rfc3339);
        assert_eq!(config.on_fatal, FatalAction::Continue);
    }

    #[test]
    fn test_missing_path_is_rejected() {
        let err = LoggerConfig::from_json_str(r#"{ "level": "LEVEL_ALL" }"#).unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }

    #[test]
    fn test_bad_level_is_rejected() {
        assert!(LoggerConfig::from_json_str(r#"{ "path": "a.log", "level": "LOUD" }"#).is_err());
    }

    #[test]
    fn test_bad_custom_timestamp_is_rejected() {
        let err = LoggerConfig::from_json_str(
            r#"{ "path": "a.log", "timestamp_format": { "Custom": "%Y %Q" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("logger.json");

        let mut config = LoggerConfig::new(dir.path().join("app.log"));
        config.level = LevelMask::PRODUCTION;
        config.compress = CompressMode::Zip;
        fs::write(&config_path, config.to_json_pretty().unwrap()).unwrap();

        let loaded = LoggerConfig::from_json_file(&config_path).unwrap();
        assert_eq!(loaded, config);

        let logger = loaded.build().unwrap();
        assert_eq!(logger.level(), LevelMask::PRODUCTION);
        assert_eq!(logger.compress_mode(), CompressMode::Zip);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let err = LoggerConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LoggerError::IoOperation { .. }));
    }
}
