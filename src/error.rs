//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for quiz operations.
pub type Result<T, E = QuizError> = std::result::Result<T, E>;

/// The question store could not be read.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read question bank {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse question bank {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("question {id} has correct index {index}, expected 0..4")]
    InvalidQuestion { id: String, index: usize },

    #[error("question store unavailable: {0}")]
    Unavailable(String),
}

/// A key-value backend failed to read or write.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The configuration file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unable to determine a home directory for application data")]
    NoHomeDirectory,
}

/// Errors surfaced by quiz and mock exam sessions.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The store was unreachable or returned garbage. Retrying may help.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The store answered, but nothing matched.
    #[error("{}", describe_empty(.subject))]
    EmptyResult { subject: Option<String> },

    /// A session operation was called in a state that forbids it.
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl QuizError {
    /// Whether the user can reasonably retry the operation that failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QuizError::Fetch(_))
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, QuizError::EmptyResult { .. })
    }
}

fn describe_empty(subject: &Option<String>) -> String {
    match subject {
        Some(subject) => format!("No questions found for {}", subject),
        None => "No questions available at the moment.".to_string(),
    }
}
