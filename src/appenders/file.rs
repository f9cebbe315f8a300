//! File appender owning the active log file
//!
//! [`LogFile`] holds the open handle together with the path it was opened
//! at and the date the current file was started. The logger keeps it behind
//! one mutex, so writes, the periodic sync, and rotation's rename never
//! interleave.

use crate::core::{Appender, LogEntry, LoggerError, Result, TimestampFormat};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct LogFile {
    path: PathBuf,
    /// `None` after close, or after a failed reopen until the next sync
    writer: Option<BufWriter<File>>,
    closed: bool,
    opened_at: DateTime<Local>,
    timestamp_format: TimestampFormat,
}

impl LogFile {
    /// Open `path` for appending, creating missing parent directories.
    ///
    /// When the file already holds data, its modification time becomes the
    /// opened date so a file left over from an earlier day still rotates
    /// under that day's name.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::EmptyPath`] for an empty path, or an IO error if
    /// the directory or file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(LoggerError::EmptyPath);
        }

        let file = open_append(&path)?;
        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;

        let opened_at = if metadata.len() > 0 {
            metadata
                .modified()
                .map(DateTime::<Local>::from)
                .unwrap_or_else(|_| Local::now())
        } else {
            Local::now()
        };

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            closed: false,
            opened_at,
            timestamp_format: TimestampFormat::default(),
        })
    }

    pub fn set_timestamp_format(&mut self, format: TimestampFormat) {
        self.timestamp_format = format;
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Date the current file was started
    #[must_use]
    pub fn opened_at(&self) -> DateTime<Local> {
        self.opened_at
    }

    pub(crate) fn set_opened_at(&mut self, opened_at: DateTime<Local>) {
        self.opened_at = opened_at;
    }

    /// Closed by [`LogFile::close`]. A file that merely lost its handle is
    /// not closed; the next [`LogFile::reopen_if_missing`] restores it.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Size of the file at the active path; 0 if it does not exist.
    pub fn len_on_disk(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Append an already formatted record and hand it to the operating
    /// system. Durability is left to [`LogFile::sync`].
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        if self.closed {
            return Err(LoggerError::LoggerStopped);
        }
        let writer = self.writer.as_mut().ok_or_else(|| {
            LoggerError::file_appender(
                self.path.display().to_string(),
                "no open handle; waiting for the file to be recreated",
            )
        })?;
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to write log entry: {}", e),
                )
            })
    }

    /// Recreate the file if it vanished from disk, or reopen it if an
    /// earlier reopen failed.
    ///
    /// Returns `true` when a new handle was opened. A closed file is left
    /// closed.
    pub fn reopen_if_missing(&mut self) -> Result<bool> {
        if self.closed || (self.writer.is_some() && self.path.exists()) {
            return Ok(false);
        }

        // Bytes still buffered belong to the unlinked file.
        if let Some(mut stale) = self.writer.take() {
            let _ = stale.flush();
        }

        let file = open_append(&self.path)?;
        self.writer = Some(BufWriter::new(file));
        Ok(true)
    }

    /// Flush buffered records and force them to durable storage.
    pub fn sync(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::io_operation("flushing log file", self.path.display().to_string(), e)
            })?;
            writer.get_ref().sync_data().map_err(|e| {
                LoggerError::io_operation("syncing log file", self.path.display().to_string(), e)
            })?;
        }
        Ok(())
    }

    /// Move the active file to `dest` and start a fresh file at the old path.
    ///
    /// The handle is reopened even when the rename fails, so writers keep a
    /// usable file either way. If the reopen itself fails the file is left
    /// without a handle, not closed, and the sync loop retries.
    pub fn rename_to(&mut self, dest: &Path) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }
        // Some platforms refuse to rename open files.
        self.writer = None;

        let renamed = fs::rename(&self.path, dest).map_err(|e| {
            LoggerError::file_rotation(
                self.path.display().to_string(),
                format!("Failed to rename to '{}': {}", dest.display(), e),
            )
        });

        let file = open_append(&self.path).map_err(|e| {
            LoggerError::file_rotation(
                self.path.display().to_string(),
                format!("Failed to create new log file: {}", e),
            )
        })?;
        self.writer = Some(BufWriter::new(file));

        renamed
    }

    /// Flush, sync and release the handle. Later writes fail with
    /// [`LoggerError::LoggerStopped`].
    pub fn close(&mut self) -> Result<()> {
        let result = self.sync();
        self.writer = None;
        self.closed = true;
        result
    }
}

impl Appender for LogFile {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let line = entry.format_line(&self.timestamp_format);
        self.write_line(&line)
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        // Best effort; errors cannot be reported from drop
        let _ = Appender::flush(self);
    }
}

/// Create the parent directory if needed and open `path` in append mode.
fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_log_dir(parent).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    options.open(path).map_err(|e| {
        LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
    })
}

fn create_log_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}
