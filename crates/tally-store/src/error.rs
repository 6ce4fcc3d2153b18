//! Error types for tally-store.

use std::path::PathBuf;

/// Result type for tally-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tally-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to create the directory holding the store file.
    #[error("Failed to create store directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Persisted data exists but is not a valid aggregate.
    #[error("Failed to parse store: {0}")]
    Parse(#[from] serde_json::Error),

    /// The aggregate could not be encoded for writing.
    #[error("Failed to serialize store: {0}")]
    Serialize(serde_json::Error),

    /// A persisted key is not a valid device identifier.
    #[error("Store contains invalid device_id: {0}")]
    InvalidDeviceId(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
