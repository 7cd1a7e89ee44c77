//! Severity levels and HTTP status mapping.
//!
//! # Design Decisions
//! - Lower numeric value = higher priority (`critical = 0` .. `debug = 4`)
//! - A sink keeps a record when its level is at or above the configured minimum,
//!   i.e. `level.priority() <= minimum.priority()`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Log severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Level {
    Critical = 0,
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Debug = 4,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Critical,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
    ];

    /// Numeric priority; `0` is the most severe.
    pub fn priority(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    /// Whether a record at `self` passes a sink configured with `minimum`.
    pub fn enabled_at(self, minimum: Level) -> bool {
        self.priority() <= minimum.priority()
    }

    /// Whether this level is already warn, error or critical.
    pub fn is_elevated(self) -> bool {
        self <= Level::Warn
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Level::Critical),
            "error" => Ok(Level::Error),
            "warn" | "warning" => Ok(Level::Warn),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, <Level as TryFrom<String>>::Error> {
        value.parse()
    }
}

/// Level of the completion record for a response status.
pub fn level_for_status(status: u16) -> Level {
    match status {
        0 => Level::Warn,
        1..=399 => Level::Info,
        400..=499 => Level::Warn,
        _ => Level::Error,
    }
}

/// Human label for a response status.
pub fn status_label(status: u16) -> &'static str {
    match status {
        100..=299 => "OK",
        300..=399 => "Redirect",
        400..=499 => "Client Error",
        500.. => "Server Error",
        _ => "Unknown",
    }
}
