use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message severity, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Info,
    Summary,
    Warning,
    Error,
    System,
}

impl Level {
    /// Single-letter indicator shown in message headers.
    /// `Summary` and `System` share `S`; they differ by colour only.
    pub fn indicator(&self) -> char {
        match self {
            Level::Info => 'I',
            Level::Summary => 'S',
            Level::Warning => 'W',
            Level::Error => 'E',
            Level::System => 'S',
        }
    }

    /// Returns true when a message at this level passes a `minimum` filter
    pub fn passes(&self, minimum: Level) -> bool {
        *self >= minimum
    }

    /// Returns all levels in ascending severity
    pub fn all() -> [Level; 5] {
        [
            Level::Info,
            Level::Summary,
            Level::Warning,
            Level::Error,
            Level::System,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Summary => "summary",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::System => "system",
        }
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "i" | "info" => Ok(Level::Info),
            "summary" => Ok(Level::Summary),
            "w" | "warn" | "warning" => Ok(Level::Warning),
            "e" | "error" => Ok(Level::Error),
            "system" => Ok(Level::System),
            _ => Err(anyhow!(
                "Invalid level: '{}'. Valid options: info, summary, warning, error, system",
                s
            )),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}
