//! Log entry structure

use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
    /// Caller annotation, already bracketed: `[function file line]`
    pub caller: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String) -> Self {
        Self {
            level,
            message,
            timestamp: Local::now(),
            caller: None,
        }
    }

    pub fn with_caller(mut self, caller: Option<String>) -> Self {
        self.caller = caller;
        self
    }

    /// Render the entry as a single newline-terminated record:
    /// timestamp, label (absent for access lines), caller, message.
    pub fn format_line(&self, timestamp_format: &TimestampFormat) -> String {
        let mut output = timestamp_format.format(&self.timestamp);

        let label = self.level.label();
        if !label.is_empty() {
            output.push(' ');
            output.push_str(label);
        }

        if let Some(ref caller) = self.caller {
            output.push(' ');
            output.push_str(caller);
        }

        output.push(' ');
        output.push_str(self.message.strip_suffix('\n').unwrap_or(&self.message));
        output.push('\n');
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_contains_label_and_message() {
        let entry = LogEntry::new(LogLevel::Warn, "disk almost full".to_string());
        let line = entry.format_line(&TimestampFormat::Standard);

        assert!(line.ends_with(" WARN disk almost full\n"));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn test_access_line_has_no_label() {
        let entry = LogEntry::new(LogLevel::Access, "GET /index.html 200".to_string());
        let line = entry.format_line(&TimestampFormat::Custom("T".to_string()));

        assert_eq!(line, "T GET /index.html 200\n");
    }

    #[test]
    fn test_caller_precedes_message() {
        let entry = LogEntry::new(LogLevel::Error, "boom\n".to_string())
            .with_caller(Some("[handler server.rs 42]".to_string()));
        let line = entry.format_line(&TimestampFormat::Custom("T".to_string()));

        assert_eq!(line, "T ERROR [handler server.rs 42] boom\n");
    }
}
