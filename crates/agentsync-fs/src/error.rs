//! Error types for agentsync-fs

use std::path::PathBuf;

/// Result type for agentsync-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in agentsync-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File or directory could not be read or written
    #[error("Cannot access {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Post-copy hash verification failed
    #[error("Integrity check failed for {path}: expected {expected}, got {actual}")]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Advisory lock could not be acquired on a staged file
    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    /// I/O error not tied to readability of a specific unit
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backup metadata could not be serialized
    #[error("Failed to encode backup metadata: {0}")]
    MetadataEncode(#[from] toml::ser::Error),
}

impl Error {
    pub fn access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Access {
            path: path.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
