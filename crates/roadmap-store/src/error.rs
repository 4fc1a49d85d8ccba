//! Error types for persistence
//!
//! Adapters report failures; trackers log and swallow them so the user never
//! sees a storage error.

use std::path::PathBuf;

/// Persistence failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Write would exceed the adapter's quota
    #[error("quota exceeded writing '{key}' (limit {limit} bytes)")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Quota in bytes
        limit: usize,
    },

    /// Value could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Backing file could not be read or written
    #[error("io error on {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Backend is not available at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
