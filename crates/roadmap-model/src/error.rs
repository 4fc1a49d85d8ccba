//! Error types for loading steps
//!
//! Only loading can fail. Once a repository exists every operation on it is
//! total.

use std::path::PathBuf;

/// A single step record failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    /// Identifier is empty or whitespace
    #[error("step at position {position} has an empty id")]
    EmptyId {
        /// Zero-based index in the source list
        position: usize,
    },

    /// Two steps share an identifier
    #[error("duplicate step id: '{0}'")]
    DuplicateId(String),

    /// Title is empty or whitespace
    #[error("step '{0}' has an empty title")]
    EmptyTitle(String),
}

/// Loading a repository failed
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Document is not valid JSON for a step list
    #[error("invalid json step list: {0}")]
    Json(#[from] serde_json::Error),

    /// Document is not valid YAML for a step list
    #[error("invalid yaml step list: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A record was rejected
    #[error("invalid step: {0}")]
    Step(#[from] StepError),

    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File extension does not name a supported format
    #[error("unsupported step file extension: '{0}'")]
    UnsupportedFormat(String),
}

impl RepositoryError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
