//! Persistence of saved form schemas over a key/value backend.
pub mod backend;
pub mod config;
pub mod error;
pub mod repository;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use config::{StorageConfig, DEFAULT_STORAGE_KEY};
pub use error::{StorageError, StorageResult};
pub use repository::SchemaRepository;
