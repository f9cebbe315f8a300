//! Main logger implementation
//!
//! A [`Logger`] owns one log file. Foreground calls format a record and
//! append it; two background threads keep the file synced to disk and
//! rotate it at the day boundary. All three paths go through the same
//! mutex around the [`LogFile`], so a rotation's rename is atomic with
//! respect to writers and the sync loop.

use super::{
    appender::Appender,
    error::{LoggerError, Result},
    log_entry::LogEntry,
    log_level::{LevelMask, LogLevel},
    metrics::LoggerMetrics,
    stack_annotation::{caller_annotation, DEFAULT_MAX_DEPTH},
    timestamp::TimestampFormat,
    worker::Workers,
};
use crate::appenders::compression::CompressMode;
use crate::appenders::file::LogFile;
use crate::appenders::rotation::{force_rotate, RotationOutcome};
use chrono::Local;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default interval between background flushes to disk
pub const DEFAULT_TIME_SYNC: Duration = Duration::from_secs(1);

/// Severities annotated with the caller location by default
pub const DEFAULT_STACK_TRACE: LevelMask =
    LevelMask::from_bits(LogLevel::Error.bits() | LogLevel::Warn.bits());

/// Process exit status after a fatal message or an unrecoverable sync failure
pub const FATAL_EXIT_CODE: i32 = 1;

const PANIC_HEADER: &str = "========================== panic ==========================";
const PANIC_FOOTER: &str = "===================================================================";

/// What happens after a fatal-severity message has been written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatalAction {
    /// Close the file and terminate the process with [`FATAL_EXIT_CODE`]
    #[default]
    Exit,
    /// Close the file, stop the background threads, and return to the caller
    Continue,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) level: LevelMask,
    pub(crate) stack_trace: LevelMask,
    pub(crate) time_sync: Duration,
    pub(crate) max_depth: usize,
    pub(crate) compress_mode: CompressMode,
    pub(crate) on_fatal: FatalAction,
    pub(crate) timestamp_format: TimestampFormat,
}

/// State shared between the facade and the background threads
pub(crate) struct Shared {
    pub(crate) path: PathBuf,
    pub(crate) rotation: bool,
    pub(crate) file: Mutex<LogFile>,
    pub(crate) settings: RwLock<Settings>,
    pub(crate) metrics: LoggerMetrics,
}

impl Shared {
    /// Recreate the file if it vanished, then flush it to durable storage.
    ///
    /// Failing to recreate the file is unrecoverable: under
    /// [`FatalAction::Exit`] the process terminates.
    pub(crate) fn sync_tick(&self) -> Result<()> {
        let mut file = self.file.lock();

        match file.reopen_if_missing() {
            Ok(true) => {
                self.metrics.record_file_recreated();
            }
            Ok(false) => {}
            Err(e) => {
                eprintln!("[LOGGER CRITICAL] Failed to recreate log file: {}", e);
                if self.settings.read().on_fatal == FatalAction::Exit {
                    std::process::exit(FATAL_EXIT_CODE);
                }
                return Err(e);
            }
        }

        file.sync()
    }

    /// Report a rotation attempt. Errors are never propagated past here:
    /// the opened date has already advanced and the uncompressed file, if
    /// any, remains on disk.
    pub(crate) fn record_rotation(&self, result: &Result<RotationOutcome>) {
        match result {
            Ok(RotationOutcome::NotDue) => {}
            Ok(RotationOutcome::SkippedEmpty) => {
                self.metrics.record_empty_rotation();
            }
            Ok(RotationOutcome::Rotated { .. }) => {
                self.metrics.record_rotation();
            }
            Err(LoggerError::LoggerStopped) => {}
            Err(e) => {
                self.metrics.record_rotation_failure();
                eprintln!("[LOGGER ERROR] Log rotation failed: {}", e);
            }
        }
    }
}

pub struct Logger {
    shared: Arc<Shared>,
    workers: Mutex<Workers>,
}

impl Logger {
    /// Open `path` and start the background threads.
    ///
    /// `level` selects the severities that are written. With `rotate` set
    /// the file is renamed and gzip-compressed at every day boundary.
    ///
    /// # Errors
    ///
    /// [`LoggerError::EmptyPath`] for an empty path, before anything touches
    /// the filesystem; an IO error if the directory or file cannot be
    /// created.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_rotating_logger::{LogLevel, Logger};
    ///
    /// let logger = Logger::new("/var/log/app/app.log", LogLevel::Error | LogLevel::Info, true)?;
    /// logger.info("service started");
    /// # Ok::<(), rust_rotating_logger::LoggerError>(())
    /// ```
    pub fn new(path: impl Into<PathBuf>, level: impl Into<LevelMask>, rotate: bool) -> Result<Self> {
        Self::builder(path).level(level).rotation(rotate).build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```no_run
    /// use rust_rotating_logger::prelude::*;
    /// use std::time::Duration;
    ///
    /// let logger = Logger::builder("logs/app.log")
    ///     .level(LevelMask::PRODUCTION)
    ///     .rotation(true)
    ///     .compress_mode(CompressMode::Zip)
    ///     .sync_interval(Duration::from_millis(500))
    ///     .build()?;
    /// # Ok::<(), LoggerError>(())
    /// ```
    #[must_use]
    pub fn builder(path: impl Into<PathBuf>) -> LoggerBuilder {
        LoggerBuilder::new(path)
    }

    fn from_builder(builder: LoggerBuilder) -> Result<Self> {
        if builder.path.as_os_str().is_empty() {
            return Err(LoggerError::EmptyPath);
        }
        builder.timestamp_format.validate()?;

        let mut file = LogFile::open(&builder.path)?;
        file.set_timestamp_format(builder.timestamp_format.clone());

        let shared = Arc::new(Shared {
            path: builder.path,
            rotation: builder.rotation,
            file: Mutex::new(file),
            settings: RwLock::new(Settings {
                level: builder.level,
                stack_trace: builder.stack_trace,
                time_sync: builder.time_sync,
                max_depth: builder.max_depth,
                compress_mode: builder.compress_mode,
                on_fatal: builder.on_fatal,
                timestamp_format: builder.timestamp_format,
            }),
            metrics: LoggerMetrics::new(),
        });

        let workers = Workers::start(&shared, builder.rotation)?;

        Ok(Self {
            shared,
            workers: Mutex::new(workers),
        })
    }

    // Configuration

    /// Severities that are written
    pub fn set_level(&self, level: impl Into<LevelMask>) {
        self.shared.settings.write().level = level.into();
    }

    /// Severities annotated with the caller location
    pub fn set_stack_trace(&self, levels: impl Into<LevelMask>) {
        self.shared.settings.write().stack_trace = levels.into();
    }

    /// Interval of the background sync loop. A zero duration is ignored.
    pub fn set_time_sync(&self, interval: Duration) {
        if !interval.is_zero() {
            self.shared.settings.write().time_sync = interval;
        }
    }

    /// Stack frames skipped when locating the caller
    pub fn set_max_depth(&self, depth: usize) {
        self.shared.settings.write().max_depth = depth;
    }

    /// Compress rotated files with gzip. Only used when rotation is enabled.
    pub fn set_compress_mode_gzip(&self) {
        self.set_compress_mode(CompressMode::Gzip);
    }

    /// Compress rotated files with zip. Only used when rotation is enabled.
    pub fn set_compress_mode_zip(&self) {
        self.set_compress_mode(CompressMode::Zip);
    }

    pub fn set_compress_mode(&self, mode: CompressMode) {
        self.shared.settings.write().compress_mode = mode;
    }

    pub fn set_fatal_action(&self, action: FatalAction) {
        self.shared.settings.write().on_fatal = action;
    }

    /// # Errors
    ///
    /// [`LoggerError::InvalidConfiguration`] for a custom format chrono
    /// cannot render; the current format stays in effect.
    pub fn set_timestamp_format(&self, format: TimestampFormat) -> Result<()> {
        format.validate()?;
        self.shared.file.lock().set_timestamp_format(format.clone());
        self.shared.settings.write().timestamp_format = format;
        Ok(())
    }

    #[must_use]
    pub fn timestamp_format(&self) -> TimestampFormat {
        self.shared.settings.read().timestamp_format.clone()
    }

    // Introspection

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    #[must_use]
    pub fn level(&self) -> LevelMask {
        self.shared.settings.read().level
    }

    #[must_use]
    pub fn stack_trace(&self) -> LevelMask {
        self.shared.settings.read().stack_trace
    }

    #[must_use]
    pub fn time_sync(&self) -> Duration {
        self.shared.settings.read().time_sync
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.shared.settings.read().max_depth
    }

    #[must_use]
    pub fn compress_mode(&self) -> CompressMode {
        self.shared.settings.read().compress_mode
    }

    #[must_use]
    pub fn fatal_action(&self) -> FatalAction {
        self.shared.settings.read().on_fatal
    }

    #[must_use]
    pub fn rotation_enabled(&self) -> bool {
        self.shared.rotation
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.file.lock().is_closed()
    }

    /// Whether the sync and rotation threads are still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.workers.lock().is_running()
    }

    /// Get the logger metrics
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_rotating_logger::{LevelMask, Logger};
    ///
    /// let logger = Logger::new("app.log", LevelMask::ALL, true)?;
    /// logger.info("hello");
    ///
    /// let metrics = logger.metrics();
    /// println!("Written: {}", metrics.lines_written());
    /// println!("Rotations: {}", metrics.rotations());
    /// # Ok::<(), rust_rotating_logger::LoggerError>(())
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// Whether a message at `level` would be written
    #[inline]
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.shared.settings.read().level.contains(level)
    }

    // Writing
    //
    // Every public entry point calls `emit` directly so the caller sits at
    // the same stack depth for all of them.

    /// Write the arguments concatenated without separators.
    #[inline(never)]
    pub fn print(&self, level: LogLevel, args: &[&dyn Display]) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, concat_args(args));
    }

    /// Write the arguments separated by single spaces.
    #[inline(never)]
    pub fn println(&self, level: LogLevel, args: &[&dyn Display]) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, join_args(args));
    }

    /// Write preformatted arguments, usually from `format_args!` or the
    /// crate's logging macros.
    #[inline(never)]
    pub fn printf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, args.to_string());
    }

    #[inline(never)]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, message.into());
    }

    /// Same as [`Logger::print`] at fatal severity: after the record is on
    /// disk the file is closed and, under [`FatalAction::Exit`], the process
    /// exits with [`FATAL_EXIT_CODE`].
    #[inline(never)]
    pub fn fatal(&self, args: &[&dyn Display]) {
        if !self.enabled(LogLevel::Fatal) {
            return;
        }
        self.emit(LogLevel::Fatal, concat_args(args));
    }

    /// Same as [`Logger::println`] at fatal severity.
    #[inline(never)]
    pub fn fatalln(&self, args: &[&dyn Display]) {
        if !self.enabled(LogLevel::Fatal) {
            return;
        }
        self.emit(LogLevel::Fatal, join_args(args));
    }

    /// Same as [`Logger::printf`] at fatal severity.
    #[inline(never)]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        if !self.enabled(LogLevel::Fatal) {
            return;
        }
        self.emit(LogLevel::Fatal, args.to_string());
    }

    #[inline(never)]
    pub fn access(&self, message: impl Into<String>) {
        if !self.enabled(LogLevel::Access) {
            return;
        }
        self.emit(LogLevel::Access, message.into());
    }

    #[inline(never)]
    pub fn error(&self, message: impl Into<String>) {
        if !self.enabled(LogLevel::Error) {
            return;
        }
        self.emit(LogLevel::Error, message.into());
    }

    #[inline(never)]
    pub fn warn(&self, message: impl Into<String>) {
        if !self.enabled(LogLevel::Warn) {
            return;
        }
        self.emit(LogLevel::Warn, message.into());
    }

    #[inline(never)]
    pub fn info(&self, message: impl Into<String>) {
        if !self.enabled(LogLevel::Info) {
            return;
        }
        self.emit(LogLevel::Info, message.into());
    }

    #[inline(never)]
    pub fn debug(&self, message: impl Into<String>) {
        if !self.enabled(LogLevel::Debug) {
            return;
        }
        self.emit(LogLevel::Debug, message.into());
    }

    /// Write a delimited panic report at error severity. Does not re-raise
    /// the panic or terminate.
    #[inline(never)]
    pub fn write_panic(&self, payload: &(dyn Any + Send), stack: &[u8]) {
        if !self.enabled(LogLevel::Error) {
            return;
        }
        self.emit(LogLevel::Error, panic_report(payload, stack));
    }

    /// Chain a process-wide panic hook that writes every panic, with a
    /// backtrace taken at the panic site, through [`Logger::write_panic`].
    /// The previously installed hook still runs afterwards.
    ///
    /// The hook holds a weak reference; once the logger is dropped it only
    /// forwards to the previous hook.
    pub fn install_panic_hook(logger: &Arc<Logger>) {
        let weak = Arc::downgrade(logger);
        let previous = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info| {
            if let Some(logger) = weak.upgrade() {
                let mut stack = String::new();
                if let Some(location) = info.location() {
                    stack.push_str(&format!(
                        "panicked at {}:{}:{}\n",
                        location.file(),
                        location.line(),
                        location.column()
                    ));
                }
                stack.push_str(&format!("{:?}", backtrace::Backtrace::new()));

                logger.write_panic(info.payload(), stack.as_bytes());
                if let Err(e) = logger.flush() {
                    eprintln!("[LOGGER ERROR] Failed to flush panic report: {}", e);
                }
            }
            previous(info);
        }));
    }

    /// Annotate, format and append one record; handle the fatal path.
    ///
    /// The line is fully rendered before the file lock is taken.
    #[inline(never)]
    fn emit(&self, level: LogLevel, message: String) {
        let (annotate, depth, on_fatal, timestamp_format) = {
            let settings = self.shared.settings.read();
            (
                settings.stack_trace.contains(level),
                settings.max_depth,
                settings.on_fatal,
                settings.timestamp_format.clone(),
            )
        };

        let caller = if annotate {
            Some(caller_annotation(depth))
        } else {
            None
        };
        let line = LogEntry::new(level, message)
            .with_caller(caller)
            .format_line(&timestamp_format);

        let mut file = self.shared.file.lock();
        match file.write_line(&line) {
            Ok(()) => {
                self.shared.metrics.record_written();
            }
            Err(LoggerError::LoggerStopped) => {
                self.shared.metrics.record_dropped();
            }
            Err(e) => {
                self.shared.metrics.record_dropped();
                eprintln!("[LOGGER ERROR] Failed to write log entry: {}", e);
            }
        }

        if level != LogLevel::Fatal {
            return;
        }

        if let Err(e) = file.close() {
            eprintln!("[LOGGER ERROR] Failed to close log file after fatal message: {}", e);
        }
        if on_fatal == FatalAction::Exit {
            std::process::exit(FATAL_EXIT_CODE);
        }
        drop(file);
        self.workers.lock().stop();
    }

    // Lifecycle

    /// Push buffered records to the operating system.
    pub fn flush(&self) -> Result<()> {
        self.shared.file.lock().flush()
    }

    /// Run one sync-loop step now: recreate a vanished file and flush to
    /// durable storage.
    pub fn sync(&self) -> Result<()> {
        self.shared.sync_tick()
    }

    /// Rotate now, without waiting for the day boundary. The rotated file
    /// is named after the date the active file was opened and compressed
    /// on the calling thread.
    ///
    /// # Errors
    ///
    /// [`LoggerError::InvalidConfiguration`] when rotation is disabled,
    /// [`LoggerError::LoggerStopped`] after close, or the rename or
    /// compression failure.
    pub fn rotate(&self) -> Result<RotationOutcome> {
        if !self.shared.rotation {
            return Err(LoggerError::config(
                "rotation",
                "file rotation is disabled for this logger",
            ));
        }

        let mode = self.compress_mode();
        let result = force_rotate(&self.shared.file, Local::now(), mode);
        self.shared.record_rotation(&result);
        result
    }

    /// Stop the background threads, then flush, sync and release the file.
    /// Later writes are dropped. Calling it again is a no-op.
    pub fn close(&self) -> Result<()> {
        self.workers.lock().stop();
        self.shared.file.lock().close()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close log file during shutdown: {}", e);
        }
    }
}

fn concat_args(args: &[&dyn Display]) -> String {
    args.iter().map(|a| a.to_string()).collect()
}

fn join_args(args: &[&dyn Display]) -> String {
    args.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn panic_report(payload: &(dyn Any + Send), stack: &[u8]) -> String {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    };

    format!(
        "{}\n{}\n{}\n{}",
        PANIC_HEADER,
        message,
        String::from_utf8_lossy(stack),
        PANIC_FOOTER
    )
}

/// Builder for constructing Logger with a fluent API
pub struct LoggerBuilder {
    path: PathBuf,
    level: LevelMask,
    rotation: bool,
    compress_mode: CompressMode,
    time_sync: Duration,
    stack_trace: LevelMask,
    max_depth: usize,
    timestamp_format: TimestampFormat,
    on_fatal: FatalAction,
}

impl LoggerBuilder {
    /// Create a new builder with default values: every level enabled, no
    /// rotation, gzip compression, one second sync interval, caller
    /// annotations on errors and warnings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            level: LevelMask::ALL,
            rotation: false,
            compress_mode: CompressMode::default(),
            time_sync: DEFAULT_TIME_SYNC,
            stack_trace: DEFAULT_STACK_TRACE,
            max_depth: DEFAULT_MAX_DEPTH,
            timestamp_format: TimestampFormat::default(),
            on_fatal: FatalAction::default(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: impl Into<LevelMask>) -> Self {
        self.level = level.into();
        self
    }

    /// Enable daily rotation with compression of the rotated file
    #[must_use = "builder methods return a new value"]
    pub fn rotation(mut self, enabled: bool) -> Self {
        self.rotation = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn compress_mode(mut self, mode: CompressMode) -> Self {
        self.compress_mode = mode;
        self
    }

    /// Interval of the background sync loop. A zero duration is ignored.
    #[must_use = "builder methods return a new value"]
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.time_sync = interval;
        }
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stack_trace(mut self, levels: impl Into<LevelMask>) -> Self {
        self.stack_trace = levels.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_fatal(mut self, action: FatalAction) -> Self {
        self.on_fatal = action;
        self
    }

    /// Open the file and start the background threads.
    pub fn build(self) -> Result<Logger> {
        Logger::from_builder(self)
    }
}
