//! Severity levels understood by the femtologging core.
//!
//! Levels are totally ordered from least to most severe. Hooks use
//! [`FemtoLevel::ALL`] to advertise the subset of levels they subscribe to.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FemtoLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Critical,
}

/// Error returned when a level name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FemtoLevel {
    /// Every level, ordered from least to most severe.
    pub const ALL: [FemtoLevel; 6] = [
        FemtoLevel::Trace,
        FemtoLevel::Debug,
        FemtoLevel::Info,
        FemtoLevel::Warn,
        FemtoLevel::Error,
        FemtoLevel::Critical,
    ];

    /// Upper-case name of the level, as rendered by formatters.
    pub const fn as_str(self) -> &'static str {
        match self {
            FemtoLevel::Trace => "TRACE",
            FemtoLevel::Debug => "DEBUG",
            FemtoLevel::Info => "INFO",
            FemtoLevel::Warn => "WARN",
            FemtoLevel::Error => "ERROR",
            FemtoLevel::Critical => "CRITICAL",
        }
    }

    /// Return every level at least as severe as `self`, preserving order.
    pub fn and_above(self) -> Vec<FemtoLevel> {
        Self::ALL.into_iter().filter(|level| *level >= self).collect()
    }
}

impl fmt::Display for FemtoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FemtoLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

impl From<FemtoLevel> for u8 {
    fn from(level: FemtoLevel) -> Self {
        level as u8
    }
}

impl From<u8> for FemtoLevel {
    /// Values above the highest discriminant saturate to `Critical`.
    fn from(value: u8) -> Self {
        match value {
            0 => FemtoLevel::Trace,
            1 => FemtoLevel::Debug,
            2 => FemtoLevel::Info,
            3 => FemtoLevel::Warn,
            4 => FemtoLevel::Error,
            _ => FemtoLevel::Critical,
        }
    }
}
