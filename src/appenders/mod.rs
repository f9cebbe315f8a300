//! The log file and what happens to it at the day boundary

pub mod compression;
pub mod file;
pub mod rotation;

pub use compression::{compress, CompressMode};
pub use file::LogFile;
pub use rotation::{force_rotate, rotate_if_due, rotated_path, RotationOutcome, ROTATION_CHECK_INTERVAL};

pub use crate::core::Appender;
