//! Error types for storage backends

use thiserror::Error;

/// Errors raised inside a storage backend. They never leave the repository,
/// which logs them and falls back to "no data" or "no-op".
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid stored data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
