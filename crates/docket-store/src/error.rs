use std::path::PathBuf;

/// Errors from key/value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Writing `key` would create a record beyond the store's capacity.
    #[error("store capacity of {capacity} records exhausted writing {key}")]
    CapacityExceeded { key: String, capacity: usize },

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// The on-disk snapshot could not be decoded.
    #[error("corrupt snapshot {}: {reason}", .path.display())]
    CorruptSnapshot { path: PathBuf, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
