//! The logger context object.
//!
//! A `Logger` owns the message log (`logs.txt` + stdout) and the performance
//! memory (`logs.json`) of one log directory. It is created once by the
//! application entry point and passed by reference to whatever needs to log.
//! `LoggerSlot` keeps the "first call needs a path, later calls reuse the same
//! logger" contract without a hidden global.
//!
//! There is no internal locking. Several threads or processes sharing one log
//! directory must serialize access themselves.

use crate::application::performance_log::PerformanceLog;
use crate::config::LoggerConfig;
use crate::domain::errors::{Error, InitializationError, LogError, PersistenceError, SchemaError};
use crate::domain::level::Level;
use crate::domain::performance::{PerformanceStore, Record, describe_lines};
use crate::infrastructure::message_log::{Emission, MessageLog, MessageOptions, SourceLocation};
use crate::infrastructure::performance_persistence::JSON_FILE_NAME;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// How `Logger::log_dict` presents a recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictOptions {
    pub description: String,
    /// Also print the recording through the message log
    pub render: bool,
    pub level: Level,
}

impl Default for DictOptions {
    fn default() -> Self {
        Self {
            description: String::new(),
            render: false,
            level: Level::Summary,
        }
    }
}

impl DictOptions {
    pub fn rendered(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            render: true,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct Logger {
    log_path: PathBuf,
    json_path: PathBuf,
    compact_json: bool,
    messages: MessageLog,
    performance: PerformanceLog,
}

impl Logger {
    /// Opens `logs.txt` for appending and loads `logs.json` if it exists
    pub fn open(config: &LoggerConfig) -> Result<Self, InitializationError> {
        let messages = MessageLog::open(&config.log_path, config.min_level)?;
        Self::with_message_log(config, messages)
    }

    /// Same as `open` but with caller-supplied sinks for the message log
    pub fn with_sinks(
        config: &LoggerConfig,
        console: Box<dyn Write + Send>,
        durable: Box<dyn Write + Send>,
    ) -> Result<Self, InitializationError> {
        let messages = MessageLog::with_sinks(console, durable, config.min_level);
        Self::with_message_log(config, messages)
    }

    fn with_message_log(
        config: &LoggerConfig,
        messages: MessageLog,
    ) -> Result<Self, InitializationError> {
        let json_path = config.log_path.join(JSON_FILE_NAME);
        let mut performance = PerformanceLog::new();
        performance.load(&json_path)?;

        info!(
            "Logger initialized at {:?} (level: {}, compact json: {})",
            config.log_path, config.min_level, config.compact_json
        );
        Ok(Self {
            log_path: config.log_path.clone(),
            json_path,
            compact_json: config.compact_json,
            messages,
            performance,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    pub fn level(&self) -> Level {
        self.messages.level()
    }

    pub fn set_level(&mut self, level: Level) {
        self.messages.set_level(level);
    }

    pub fn is_json_compact(&self) -> bool {
        self.compact_json
    }

    pub fn set_json_compact(&mut self, compact: bool) {
        self.compact_json = compact;
    }

    pub fn store(&self) -> &PerformanceStore {
        self.performance.store()
    }

    /// Writes `message` at `INFO`
    #[track_caller]
    pub fn log(&mut self, message: &str) -> Result<Emission, LogError> {
        self.messages.emit(
            message,
            Level::Info,
            MessageOptions::default(),
            SourceLocation::caller(),
        )
    }

    /// Writes `message` at `level`. `ERROR` writes and then fails.
    #[track_caller]
    pub fn message(&mut self, message: &str, level: Level) -> Result<Emission, LogError> {
        self.messages.emit(
            message,
            level,
            MessageOptions::default(),
            SourceLocation::caller(),
        )
    }

    #[track_caller]
    pub fn message_with(
        &mut self,
        message: &str,
        level: Level,
        options: MessageOptions,
    ) -> Result<Emission, LogError> {
        self.messages
            .emit(message, level, options, SourceLocation::caller())
    }

    /// Appends a recording to `group`.
    ///
    /// A key-set mismatch is written to the message log at `ERROR` and returned
    /// as `Error::Schema`; the store is left unchanged.
    #[track_caller]
    pub fn record(&mut self, group: &str, record: Record) -> Result<usize, Error> {
        let location = SourceLocation::caller();
        self.record_at(group, record, location)
    }

    /// Prints a recording as `"<group>: <description>"` plus one line per key
    #[track_caller]
    pub fn describe(
        &mut self,
        group: &str,
        description: &str,
        record: &Record,
        level: Level,
    ) -> Result<Emission, LogError> {
        let location = SourceLocation::caller();
        self.describe_at(group, description, record, level, location)
    }

    /// Records and, when `options.render` is set, prints the recording
    #[track_caller]
    pub fn log_dict(
        &mut self,
        group: &str,
        record: Record,
        options: &DictOptions,
    ) -> Result<usize, Error> {
        let location = SourceLocation::caller();
        let rendered = options.render.then(|| record.clone());
        let count = self.record_at(group, record, location)?;

        if let Some(record) = rendered {
            self.describe_at(
                group,
                &options.description,
                &record,
                options.level,
                location,
            )?;
        }
        Ok(count)
    }

    /// Re-reads `logs.json`, replacing the in-memory store when the file exists
    pub fn reload(&mut self) -> Result<bool, PersistenceError> {
        self.performance.load(&self.json_path)
    }

    /// Writes the store to `logs.json` using the configured encoding
    pub fn flush(&self) -> Result<(), PersistenceError> {
        self.performance.flush(&self.json_path, self.compact_json)
    }

    pub fn load_from(&mut self, path: &Path) -> Result<bool, PersistenceError> {
        self.performance.load(path)
    }

    pub fn flush_to(&self, path: &Path, compact: bool) -> Result<(), PersistenceError> {
        self.performance.flush(path, compact)
    }

    fn record_at(
        &mut self,
        group: &str,
        record: Record,
        location: SourceLocation,
    ) -> Result<usize, Error> {
        match self.performance.record(group, record) {
            Ok(count) => Ok(count),
            Err(err) => {
                self.report_schema_error(&err, location);
                Err(Error::Schema(err))
            }
        }
    }

    fn report_schema_error(&mut self, err: &SchemaError, location: SourceLocation) {
        let outcome = self.messages.emit(
            &err.to_string(),
            Level::Error,
            MessageOptions::default(),
            location,
        );
        if let Err(LogError::Io(source)) = outcome {
            warn!("Failed to write schema violation to the message log: {}", source);
        }
    }

    fn describe_at(
        &mut self,
        group: &str,
        description: &str,
        record: &Record,
        level: Level,
        location: SourceLocation,
    ) -> Result<Emission, LogError> {
        let mut lines = describe_lines(group, description, record).into_iter();
        let header = match lines.next() {
            Some(line) => self
                .messages
                .emit(&line, level, MessageOptions::default(), location)?,
            None => return Ok(Emission::Skipped),
        };
        for line in lines {
            self.messages
                .emit(&line, level, MessageOptions::default(), location)?;
        }
        Ok(header)
    }
}

/// Initialize-once holder for the process's `Logger`.
///
/// Owned by the entry point; the first successful `initialize` installs the
/// logger and every later call returns that same instance.
#[derive(Debug, Default)]
pub struct LoggerSlot {
    logger: Option<Logger>,
}

impl LoggerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the installed logger, opening one from `config` on first use.
    ///
    /// Once a logger is installed `config` is ignored. A failed first
    /// initialization leaves the slot empty so a later call can retry.
    pub fn initialize(
        &mut self,
        config: Option<&LoggerConfig>,
    ) -> Result<&mut Logger, InitializationError> {
        if self.logger.is_none() {
            let config = config.ok_or(InitializationError::MissingPath)?;
            self.logger = Some(Logger::open(config)?);
        }
        self.logger.as_mut().ok_or(InitializationError::MissingPath)
    }

    pub fn is_initialized(&self) -> bool {
        self.logger.is_some()
    }

    pub fn get(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Logger> {
        self.logger.as_mut()
    }
}
