//! Error types for the search agent engine.

use thiserror::Error;

/// Comprehensive error type for all agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The planner could not produce a structurally valid plan after the
    /// allowed number of generation attempts.
    #[error("Could not understand the request: {detail}")]
    PlanningFailed { detail: String },
    /// The generation service reported a domain error (never retried).
    #[error("Query generation refused ({kind}): {message}")]
    GenerationRefused { kind: String, message: String },
    /// Generation service transport or protocol failure.
    #[error("Query generation failed: {message}")]
    Generation { message: String },
    /// Transient search backend failure (recovered via bounded backoff).
    #[error("Search backend error: {message}")]
    Backend { message: String },
    /// Checkpoint store errors
    #[error("Checkpoint store error: {message}")]
    Checkpoint {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },
    /// No checkpoint exists for the given thread
    #[error("No suspended conversation found for thread '{thread_id}'")]
    ThreadNotFound { thread_id: String },
    /// Resume was attempted on a thread with nothing pending
    #[error("Thread '{thread_id}' has no pending clarification")]
    NoPendingClarification { thread_id: String },
    /// A clarification choice referenced an ordinal outside the offered range
    #[error("Choice {ordinal} is out of range (expected 1..={max})")]
    InvalidSelection { ordinal: u32, max: u32 },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// XDG directory resolution errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
}

impl AgentError {
    /// Creates a backend error from any displayable cause.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a generation-service failure from any displayable cause.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Creates a checkpoint error without an underlying sqlite source.
    pub fn checkpoint(message: impl Into<String>) -> Self {
        Self::Checkpoint {
            message: message.into(),
            source: None,
        }
    }
}

/// Specialized extension trait for checkpoint-database Results.
pub trait CheckpointResultExt<T> {
    /// Map sqlite errors into checkpoint errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> CheckpointResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| AgentError::Checkpoint {
            message: message.to_string(),
            source: Some(e),
        })
    }
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
