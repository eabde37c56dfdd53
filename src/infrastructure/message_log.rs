//! Leveled line writer.
//!
//! Every message that passes the level filter is written to an interactive
//! sink (stdout by default, coloured header) and to a durable sink (`logs.txt`,
//! plain text) which is flushed after each write. `ERROR` messages are written
//! first and then reported back as `LogError::Fatal`.

use crate::domain::errors::{InitializationError, LogError};
use crate::domain::level::Level;
use crate::infrastructure::console_style::styled_header;
use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TEXT_FILE_NAME: &str = "logs.txt";

const MAX_FILE_NAME_CHARS: usize = 25;
const KEPT_FILE_NAME_CHARS: usize = 22;

/// Call-site of a message, captured with `#[track_caller]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

/// Per-message presentation switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageOptions {
    /// Terminate the message with a newline; otherwise write a partial line
    pub break_line: bool,
    /// Prefix `[<L> <timestamp>] <file>.<line>:`
    pub print_header: bool,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            break_line: true,
            print_header: true,
        }
    }
}

impl MessageOptions {
    pub fn partial() -> Self {
        Self {
            break_line: false,
            ..Self::default()
        }
    }

    pub fn bare() -> Self {
        Self {
            print_header: false,
            ..Self::default()
        }
    }
}

/// Outcome of a message call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    Written,
    /// The level was below the configured minimum; nothing was written.
    Skipped,
}

pub struct MessageLog {
    min_level: Level,
    console: Box<dyn Write + Send>,
    durable: Box<dyn Write + Send>,
    file_path: Option<PathBuf>,
}

impl std::fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageLog")
            .field("min_level", &self.min_level)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MessageLog {
    /// Opens (or creates) `logs.txt` in `dir` for appending, with stdout as the
    /// interactive sink. The file stays open for the lifetime of the log.
    pub fn open(dir: &Path, min_level: Level) -> Result<Self, InitializationError> {
        let file_path = dir.join(TEXT_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .map_err(|source| InitializationError::OpenLogFile {
                path: file_path.clone(),
                source,
            })?;

        debug!("Opened message log {:?}", file_path);
        Ok(Self {
            min_level,
            console: Box::new(io::stdout()),
            durable: Box::new(file),
            file_path: Some(file_path),
        })
    }

    pub fn with_sinks(
        console: Box<dyn Write + Send>,
        durable: Box<dyn Write + Send>,
        min_level: Level,
    ) -> Self {
        Self {
            min_level,
            console,
            durable,
            file_path: None,
        }
    }

    pub fn level(&self) -> Level {
        self.min_level
    }

    pub fn set_level(&mut self, level: Level) {
        self.min_level = level;
    }

    /// Path of the durable sink, when it is a file opened by `open`
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Writes `message` at `level` with a header pointing at the caller
    #[track_caller]
    pub fn log(&mut self, message: &str, level: Level) -> Result<Emission, LogError> {
        self.emit(
            message,
            level,
            MessageOptions::default(),
            SourceLocation::caller(),
        )
    }

    pub fn emit(
        &mut self,
        message: &str,
        level: Level,
        options: MessageOptions,
        location: SourceLocation,
    ) -> Result<Emission, LogError> {
        if !level.passes(self.min_level) {
            return Ok(Emission::Skipped);
        }

        let (durable_line, console_line) = if options.print_header {
            let header = format_header(level, chrono::Local::now());
            let locate = format!("{}.{}:", shorten_file_name(location.file), location.line);
            (
                format!("{header} {locate} {message}"),
                format!("{} {locate} {message}", styled_header(level, &header)),
            )
        } else {
            (message.to_string(), message.to_string())
        };

        if options.break_line {
            writeln!(self.console, "{console_line}")?;
            writeln!(self.durable, "{durable_line}")?;
        } else {
            write!(self.console, "{console_line}")?;
            self.console.flush()?;
            write!(self.durable, "{durable_line}")?;
        }
        self.durable.flush()?;

        if level == Level::Error {
            return Err(LogError::Fatal(message.to_string()));
        }
        Ok(Emission::Written)
    }
}

/// `[<L> <YYYY-MM-DD HH:MM:SS>]`
pub fn format_header<Tz>(level: Level, now: chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("[{} {}]", level.indicator(), now.format("%Y-%m-%d %H:%M:%S"))
}

/// Long paths keep only their last characters behind a `...` prefix
pub fn shorten_file_name(file: &str) -> Cow<'_, str> {
    let count = file.chars().count();
    if count <= MAX_FILE_NAME_CHARS {
        return Cow::Borrowed(file);
    }
    let tail: String = file.chars().skip(count - KEPT_FILE_NAME_CHARS).collect();
    Cow::Owned(format!("...{tail}"))
}
