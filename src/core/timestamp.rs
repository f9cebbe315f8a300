//! Timestamp formatting for log lines
//!
//! Lines are stamped in local time. The default matches the classic
//! `date time` prefix without fractional seconds: `2025/01/08 10:30:45`.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const STANDARD_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Timestamp format options for the line prefix
///
/// # Examples
///
/// ```
/// use rust_rotating_logger::TimestampFormat;
/// use chrono::Local;
///
/// let stamp = TimestampFormat::Standard.format(&Local::now());
/// assert_eq!(stamp.len(), "2025/01/08 10:30:45".len());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025/01/08 10:30:45`
    #[default]
    Standard,

    /// ISO 8601 with milliseconds and offset: `2025-01-08T10:30:45.123+01:00`
    Iso8601,

    /// RFC 3339 with offset: `2025-01-08T10:30:45+01:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Custom strftime format
    ///
    /// ```
    /// use rust_rotating_logger::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Reject custom strftime strings chrono cannot render.
    ///
    /// # Errors
    ///
    /// [`LoggerError::InvalidConfiguration`] naming the offending format.
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(format_str) = self {
            if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "timestamp_format",
                    format!("invalid strftime format '{}'", format_str),
                ));
            }
        }
        Ok(())
    }

    /// Format a local or fixed-offset datetime according to this format.
    ///
    /// A custom format that fails to render falls back to
    /// [`TimestampFormat::Standard`].
    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match self {
            TimestampFormat::Standard => datetime.format(STANDARD_FORMAT).to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut output = String::new();
                if write!(output, "{}", datetime.format(format_str)).is_err() {
                    return datetime.format(STANDARD_FORMAT).to_string();
                }
                output
            }
        }
    }
}
