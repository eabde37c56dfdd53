//! Logger configuration parsing from environment variables.
//!
//! This module handles loading the log directory, minimum level and JSON encoding.

use crate::domain::level::Level;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const PATH_VAR: &str = "PERFLOG_PATH";
pub const LEVEL_VAR: &str = "PERFLOG_LEVEL";
pub const COMPACT_JSON_VAR: &str = "PERFLOG_COMPACT_JSON";

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Directory holding `logs.txt` and `logs.json`
    pub log_path: PathBuf,
    pub min_level: Level,
    pub compact_json: bool,
}

impl LoggerConfig {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            min_level: Level::Info,
            compact_json: true,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_compact_json(mut self, compact: bool) -> Self {
        self.compact_json = compact;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key -> value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_path = lookup(PATH_VAR)
            .filter(|p| !p.trim().is_empty())
            .with_context(|| format!("{PATH_VAR} must be set to the log directory"))?;

        let min_level = match lookup(LEVEL_VAR) {
            Some(raw) => Level::from_str(&raw).with_context(|| format!("Invalid {LEVEL_VAR}"))?,
            None => Level::Info,
        };

        let compact_json = match lookup(COMPACT_JSON_VAR) {
            Some(raw) => raw
                .trim()
                .to_lowercase()
                .parse::<bool>()
                .with_context(|| format!("Invalid {COMPACT_JSON_VAR}: '{raw}'"))?,
            None => true,
        };

        Ok(Self {
            log_path: PathBuf::from(log_path),
            min_level,
            compact_json,
        })
    }
}
