//! Error types for agentsync-core

/// Result type for agentsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in agentsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input for a call: unknown category, empty category set.
    /// Fatal for the call; nothing has been mutated when this is returned.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The user interrupted an interactive prompt
    #[error("Cancelled by user")]
    Cancelled,

    /// Integrity-layer error from agentsync-fs
    #[error(transparent)]
    Fs(#[from] agentsync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new validation error with the given message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
