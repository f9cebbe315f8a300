//! Property-based tests for rust_rotating_logger using proptest

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_rotating_logger::appenders::rotated_path;
use rust_rotating_logger::prelude::*;
use rust_rotating_logger::should_write;
use std::path::Path;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

// ============================================================================
// Level mask tests
// ============================================================================

proptest! {
    /// A message is written iff its bit is in the mask
    #[test]
    fn test_should_write_matches_bit_arithmetic(bits in any::<u8>(), level in any_level()) {
        let mask = LevelMask::from_bits(bits);
        prop_assert_eq!(should_write(mask, level), bits & level.bits() != 0);
    }

    /// Adding a level to a mask enables it without disabling any other
    #[test]
    fn test_or_only_adds(bits in any::<u8>(), added in any_level(), checked in any_level()) {
        let mask = LevelMask::from_bits(bits);
        let widened = mask | added;
        prop_assert!(widened.contains(added));
        if mask.contains(checked) {
            prop_assert!(widened.contains(checked));
        }
    }

    /// The textual form parses back to the same mask
    #[test]
    fn test_mask_text_roundtrip(bits in any::<u8>()) {
        let mask = LevelMask::from_bits(bits);
        let parsed: LevelMask = mask.to_string().parse().unwrap();
        prop_assert_eq!(parsed, mask);
    }

    /// Level names parse case-insensitively
    #[test]
    fn test_level_name_case_insensitive(level in any_level(), lower in any::<bool>()) {
        let name = if lower { level.name().to_lowercase() } else { level.name().to_string() };
        prop_assert_eq!(name.parse::<LogLevel>().unwrap(), level);
    }
}

// ============================================================================
// Line format tests
// ============================================================================

proptest! {
    /// Every record ends with exactly one newline, whatever the message
    #[test]
    fn test_line_is_newline_terminated(level in any_level(), message in "[a-zA-Z0-9 ]{0,64}\n?") {
        let line = LogEntry::new(level, message.clone()).format_line(&TimestampFormat::Standard);
        prop_assert!(line.ends_with('\n'));
        prop_assert!(!line.ends_with("\n\n"));
        prop_assert!(line.contains(message.trim_end_matches('\n')));
    }

    /// Access lines carry no label; all others carry their name
    #[test]
    fn test_label_presence(level in any_level()) {
        let line = LogEntry::new(level, "m".to_string()).format_line(&TimestampFormat::Standard);
        prop_assert_eq!(line.contains(level.name()), level != LogLevel::Access);
    }
}

// ============================================================================
// Rotation naming tests
// ============================================================================

proptest! {
    /// The rotated file stays in the same directory and keeps the extension
    #[test]
    fn test_rotated_path_keeps_dir_and_extension(
        stem in "[a-z][a-z0-9_]{0,15}",
        ext in "[a-z]{1,4}",
        days in 0i64..40_000,
    ) {
        let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + chrono::Days::new(days as u64);
        let path = Path::new("/var/log").join(format!("{}.{}", stem, ext));

        let rotated = rotated_path(&path, date);

        prop_assert_eq!(rotated.parent(), path.parent());
        prop_assert_eq!(rotated.extension(), path.extension());
        let expected = format!("{}_{}.{}", stem, date.format("%Y%m%d"), ext);
        prop_assert_eq!(rotated.file_name().unwrap().to_str().unwrap(), expected.as_str());
    }
}
