//! Configuration module for perflog.
//!
//! Settings are read from environment variables (optionally seeded from a `.env`
//! file by the binary) or built directly with `LoggerConfig::new`.

mod logger_config;

pub use logger_config::{COMPACT_JSON_VAR, LEVEL_VAR, LoggerConfig, PATH_VAR};
