//! Daily rotation of the active log file
//!
//! Rotation has two phases. Under the file lock the active file is flushed,
//! renamed to `<base>_<YYYYMMDD><ext>` (the date it was opened) and replaced
//! by a fresh file at the original path. After the lock is released the
//! detached file is compressed, so slow compression never blocks writers.
//! Only a calendar-day change triggers rotation; there is no size trigger.

use super::compression::{compress, CompressMode};
use super::file::LogFile;
use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Local, NaiveDate};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How often the rotation loop compares the opened date with today
pub const ROTATION_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Result of one rotation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// Still the same calendar day
    NotDue,
    /// The active file was empty; it stays in place and only the opened
    /// date moved forward
    SkippedEmpty,
    /// The active file was renamed and compressed into `archive`
    Rotated { archive: PathBuf },
}

/// Dated name for a rotated file: `app.log` opened on 2024-01-01 becomes
/// `app_20240101.log`. The name is split at its last dot; a name without
/// one gets the date appended.
///
/// ```
/// use rust_rotating_logger::appenders::rotated_path;
/// use chrono::NaiveDate;
/// use std::path::{Path, PathBuf};
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert_eq!(
///     rotated_path(Path::new("/var/log/app.log"), date),
///     PathBuf::from("/var/log/app_20240101.log")
/// );
/// ```
#[must_use]
pub fn rotated_path(path: &Path, date: NaiveDate) -> PathBuf {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = date.format("%Y%m%d");

    let rotated = match filename.rfind('.') {
        Some(n) => format!("{}_{}{}", &filename[..n], stamp, &filename[n..]),
        None => format!("{}_{}", filename, stamp),
    };
    path.with_file_name(rotated)
}

/// Rotate if `now` falls on a later calendar day than the active file's
/// opened date.
///
/// # Errors
///
/// Rename and compression failures are returned after the opened date has
/// already advanced, so the next check does not retry the same boundary.
pub fn rotate_if_due(
    file: &Mutex<LogFile>,
    now: DateTime<Local>,
    mode: CompressMode,
) -> Result<RotationOutcome> {
    let detached = {
        let mut file = file.lock();
        if file.opened_at().date_naive() == now.date_naive() {
            return Ok(RotationOutcome::NotDue);
        }
        detach(&mut file, now)?
    };
    finish(detached, mode)
}

/// Rotate immediately, regardless of the date.
pub fn force_rotate(
    file: &Mutex<LogFile>,
    now: DateTime<Local>,
    mode: CompressMode,
) -> Result<RotationOutcome> {
    let detached = detach(&mut file.lock(), now)?;
    finish(detached, mode)
}

/// Critical section: move the active file aside and start a new one.
fn detach(file: &mut LogFile, now: DateTime<Local>) -> Result<Option<PathBuf>> {
    if file.is_closed() {
        return Err(LoggerError::LoggerStopped);
    }

    let opened = file.opened_at();
    file.set_opened_at(now);

    // Buffered records must reach the file before its size is judged
    file.flush()?;
    if file.len_on_disk() == 0 {
        return Ok(None);
    }

    let dest = rotated_path(file.path(), opened.date_naive());
    file.rename_to(&dest)?;
    Ok(Some(dest))
}

fn finish(detached: Option<PathBuf>, mode: CompressMode) -> Result<RotationOutcome> {
    match detached {
        None => Ok(RotationOutcome::SkippedEmpty),
        Some(dest) => compress(&dest, mode).map(|archive| RotationOutcome::Rotated { archive }),
    }
}
