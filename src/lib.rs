//! Leveled message logging plus persistent "performance memory".
//!
//! A [`Logger`] writes timestamped messages to stdout and an append-only
//! `logs.txt`, and accumulates grouped recordings that are flushed to and
//! reloaded from `logs.json`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{DictOptions, Logger, LoggerSlot, PerformanceLog};
pub use config::LoggerConfig;
pub use domain::errors::{
    Error, InitializationError, LogError, PersistenceError, SchemaError, SchemaViolation,
};
pub use domain::level::Level;
pub use domain::performance::{GroupSeries, PerformanceStore, Record};
pub use infrastructure::{Emission, MessageOptions};
