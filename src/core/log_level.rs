//! Log level definitions
//!
//! Severities are bit flags. A [`LevelMask`] is the bitwise OR of the
//! severities a logger writes; a message is written iff its bit is set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign, BitXor};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogLevel {
    /// Access log lines, written without a label
    Access = 1,
    Fatal = 2,
    Error = 4,
    Warn = 8,
    Info = 16,
    Debug = 32,
}

impl LogLevel {
    /// Every severity, lowest bit first
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Access,
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Label written in front of the message. Access lines carry none.
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Access => "",
            other => other.name(),
        }
    }

    /// Constant-style name of the severity
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Access => "ACCESS",
            LogLevel::Fatal => "FATAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACCESS" => Ok(LogLevel::Access),
            "FATAL" => Ok(LogLevel::Fatal),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Set of enabled severities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LevelMask(u8);

impl LevelMask {
    /// Disables all output
    pub const NONE: LevelMask = LevelMask(0);

    pub const ALL: LevelMask = LevelMask(
        LogLevel::Access.bits()
            | LogLevel::Fatal.bits()
            | LogLevel::Error.bits()
            | LogLevel::Warn.bits()
            | LogLevel::Info.bits()
            | LogLevel::Debug.bits(),
    );

    /// Everything except debug
    pub const PRODUCTION: LevelMask = LevelMask(Self::ALL.0 ^ LogLevel::Debug.bits());

    /// Build a mask from raw bits; bits that name no severity are dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        LevelMask(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, level: LogLevel) -> bool {
        should_write(self, level)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enabled severities, lowest bit first
    pub fn levels(self) -> impl Iterator<Item = LogLevel> {
        LogLevel::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

/// Level filter: true iff `mask & level != 0`.
#[inline]
pub const fn should_write(mask: LevelMask, level: LogLevel) -> bool {
    mask.0 & level.bits() != 0
}

impl From<LogLevel> for LevelMask {
    fn from(level: LogLevel) -> Self {
        LevelMask(level.bits())
    }
}

impl BitOr for LogLevel {
    type Output = LevelMask;

    fn bitor(self, rhs: LogLevel) -> LevelMask {
        LevelMask(self.bits() | rhs.bits())
    }
}

impl BitOr<LogLevel> for LevelMask {
    type Output = LevelMask;

    fn bitor(self, rhs: LogLevel) -> LevelMask {
        LevelMask(self.0 | rhs.bits())
    }
}

impl BitOr for LevelMask {
    type Output = LevelMask;

    fn bitor(self, rhs: LevelMask) -> LevelMask {
        LevelMask(self.0 | rhs.0)
    }
}

impl BitOrAssign<LogLevel> for LevelMask {
    fn bitor_assign(&mut self, rhs: LogLevel) {
        self.0 |= rhs.bits();
    }
}

impl BitXor<LogLevel> for LevelMask {
    type Output = LevelMask;

    fn bitxor(self, rhs: LogLevel) -> LevelMask {
        LevelMask(self.0 ^ rhs.bits())
    }
}

impl fmt::Display for LevelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LevelMask::NONE => write!(f, "NONE"),
            LevelMask::ALL => write!(f, "LEVEL_ALL"),
            LevelMask::PRODUCTION => write!(f, "LEVEL_PRODUCTION"),
            mask => {
                let names: Vec<&str> = mask.levels().map(|l| l.name()).collect();
                write!(f, "{}", names.join("|"))
            }
        }
    }
}

impl FromStr for LevelMask {
    type Err = String;

    /// Accepts `LEVEL_ALL`, `LEVEL_PRODUCTION`, `NONE`, or names joined by `|`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_uppercase().as_str() {
            "" | "NONE" => return Ok(LevelMask::NONE),
            "LEVEL_ALL" | "ALL" => return Ok(LevelMask::ALL),
            "LEVEL_PRODUCTION" | "PRODUCTION" => return Ok(LevelMask::PRODUCTION),
            _ => {}
        }

        trimmed
            .split('|')
            .try_fold(LevelMask::NONE, |mask, part| Ok(mask | part.parse::<LogLevel>()?))
    }
}

impl TryFrom<String> for LevelMask {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LevelMask> for String {
    fn from(mask: LevelMask) -> Self {
        mask.to_string()
    }
}
