//! Compression of rotated log files
//!
//! Each rotated file becomes a single-member gzip file or a one-entry zip
//! archive next to it. The archive is written under a temporary name and
//! renamed into place; the uncompressed file is only removed after that
//! succeeds, so a failure always leaves the original behind.

use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Datelike, Local, Timelike};
use flate2::{Compression, GzBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive format applied to a just-rotated file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressMode {
    #[default]
    Gzip,
    Zip,
}

impl CompressMode {
    /// Extension appended to the rotated file name
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            CompressMode::Gzip => "gz",
            CompressMode::Zip => "zip",
        }
    }

    /// Path of the archive produced for `path`
    #[must_use]
    pub fn archive_path(&self, path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(self.extension());
        PathBuf::from(name)
    }
}

/// Compress `path` with `mode` and remove it. Returns the archive path.
///
/// # Errors
///
/// Returns [`LoggerError::CompressionError`] if the archive cannot be
/// produced; `path` is left untouched in that case.
pub fn compress(path: &Path, mode: CompressMode) -> Result<PathBuf> {
    let archive = mode.archive_path(path);
    let temp = temp_path(&archive);

    let written = match mode {
        CompressMode::Gzip => compress_gzip(path, &temp),
        CompressMode::Zip => compress_zip(path, &temp),
    };

    let placed = written.and_then(|()| fs::rename(&temp, &archive).map_err(LoggerError::from));
    if let Err(e) = placed {
        let _ = fs::remove_file(&temp);
        return Err(LoggerError::compression(
            path.display().to_string(),
            e.to_string(),
        ));
    }

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}. \
             Both compressed and uncompressed versions exist.",
            path.display(),
            e
        );
    }

    Ok(archive)
}

/// Write the whole of `source` as one gzip member at maximum compression,
/// stamped with the current time.
pub fn compress_gzip(source: &Path, dest: &Path) -> Result<()> {
    let content = fs::read(source)?;

    let mtime = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(0))
        .unwrap_or(0);

    let output = BufWriter::new(File::create(dest)?);
    let mut encoder = GzBuilder::new()
        .mtime(mtime)
        .write(output, Compression::best());
    encoder.write_all(&content)?;
    encoder.finish()?.flush()?;
    Ok(())
}

/// Write `source` as the single deflated entry of a zip archive. The entry
/// carries the source's file name and modification time.
pub fn compress_zip(source: &Path, dest: &Path) -> Result<()> {
    let mut input = File::open(source)?;
    let metadata = input.metadata()?;

    let entry_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());

    let modified = metadata
        .modified()
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now());

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip_datetime(&modified))
        .large_file(metadata.len() >= u64::from(u32::MAX))
        .unix_permissions(0o644);

    let mut archive = ZipWriter::new(BufWriter::new(File::create(dest)?));
    archive.start_file(entry_name, options)?;
    io::copy(&mut input, &mut archive)?;
    archive.finish()?.flush()?;
    Ok(())
}

/// Zip timestamps cover 1980..=2107; anything outside gets the zip epoch.
fn zip_datetime(datetime: &DateTime<Local>) -> zip::DateTime {
    let (Ok(year), Ok(month), Ok(day), Ok(hour), Ok(minute), Ok(second)) = (
        u16::try_from(datetime.year()),
        u8::try_from(datetime.month()),
        u8::try_from(datetime.day()),
        u8::try_from(datetime.hour()),
        u8::try_from(datetime.minute()),
        u8::try_from(datetime.second()),
    ) else {
        return zip::DateTime::default();
    };
    zip::DateTime::from_date_and_time(year, month, day, hour, minute, second).unwrap_or_default()
}

fn temp_path(archive: &Path) -> PathBuf {
    let mut name = archive.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    const CONTENT: &str = "2024/01/01 10:00:00 INFO first\n2024/01/01 10:00:01 ERROR second\n";

    #[test]
    fn test_archive_path_appends_extension() {
        let path = Path::new("/var/log/app_20240101.log");
        assert_eq!(
            CompressMode::Gzip.archive_path(path),
            PathBuf::from("/var/log/app_20240101.log.gz")
        );
        assert_eq!(
            CompressMode::Zip.archive_path(path),
            PathBuf::from("/var/log/app_20240101.log.zip")
        );
    }

    #[test]
    fn test_gzip_round_trip_removes_original() {
        let dir = tempdir().unwrap();
        let rotated = dir.path().join("app_20240101.log");
        fs::write(&rotated, CONTENT).unwrap();

        let archive = compress(&rotated, CompressMode::Gzip).unwrap();

        assert_eq!(archive, dir.path().join("app_20240101.log.gz"));
        assert!(!rotated.exists());
        assert!(!temp_path(&archive).exists());

        let mut decoded = String::new();
        GzDecoder::new(File::open(&archive).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, CONTENT);
    }

    #[test]
    fn test_zip_round_trip_removes_original() {
        let dir = tempdir().unwrap();
        let rotated = dir.path().join("app_20240101.log");
        fs::write(&rotated, CONTENT).unwrap();

        let archive = compress(&rotated, CompressMode::Zip).unwrap();

        assert_eq!(archive, dir.path().join("app_20240101.log.zip"));
        assert!(!rotated.exists());

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert_eq!(zip.len(), 1);
        let mut entry = zip.by_index(0).unwrap();
        assert_eq!(entry.name(), "app_20240101.log");
        assert_eq!(entry.compression(), CompressionMethod::Deflated);

        let mut decoded = String::new();
        entry.read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, CONTENT);
    }

    #[test]
    fn test_failure_leaves_no_archive() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone_20240101.log");

        for mode in [CompressMode::Gzip, CompressMode::Zip] {
            let err = compress(&missing, mode).unwrap_err();
            assert!(matches!(err, LoggerError::CompressionError { .. }));
            assert!(!mode.archive_path(&missing).exists());
            assert!(!temp_path(&mode.archive_path(&missing)).exists());
        }
    }

    #[test]
    fn test_zip_datetime_clamps_out_of_range_years() {
        use chrono::TimeZone;
        let ancient = Local.with_ymd_and_hms(1970, 1, 1, 12, 0, 0).single().unwrap();
        assert_eq!(zip_datetime(&ancient), zip::DateTime::default());
    }
}
