use std::path::PathBuf;

/// Which side of the key-set comparison a recording failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaViolation {
    /// A key already tracked for the group is absent from the new recording.
    MissingKey,
    /// The new recording carries a key the group has never seen.
    UnrecognizedKey,
}

impl SchemaViolation {
    fn reason(self) -> &'static str {
        match self {
            Self::MissingKey => "not in the dictionary to be logged",
            Self::UnrecognizedKey => "is unknown",
        }
    }

    fn remedy(self) -> &'static str {
        match self {
            Self::MissingKey => "",
            Self::UnrecognizedKey => ". New keys are not allowed",
        }
    }
}

/// A recording whose key set does not match the group's established key set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Key \"{key}\" {} for group \"{group}\"{}", .violation.reason(), .violation.remedy())]
pub struct SchemaError {
    pub group: String,
    pub key: String,
    pub violation: SchemaViolation,
}

/// Errors related to reading or writing the performance JSON document
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed performance data in {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Group \"{group}\" in {path:?} has sequences of unequal length ({shortest} vs {longest})")]
    Ragged {
        path: PathBuf,
        group: String,
        shortest: usize,
        longest: usize,
    },

    #[error("Failed to serialize performance data")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while bringing up a logger
#[derive(Debug, thiserror::Error)]
pub enum InitializationError {
    #[error("Please specify a log path for the first initialization")]
    MissingPath,

    #[error("Critical: cannot open log file {path:?}. Do you have write permissions?")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load existing performance data")]
    Load(#[from] PersistenceError),
}

/// Errors returned by a message emission
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// An `ERROR`-level message was written; the caller must handle or terminate.
    #[error("{0}")]
    Fatal(String),

    #[error("Failed to write log message")]
    Io(#[from] std::io::Error),
}

/// Crate-level error wrapping every failure a `Logger` can surface
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Initialization(#[from] InitializationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Log(#[from] LogError),
}
