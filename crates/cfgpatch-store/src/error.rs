use cfgpatch_types::Kind;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No package with this ID exists.
    #[error("package not found: {0}")]
    NotFound(String),

    /// No baseline is available for this kind.
    #[error("no baseline for kind {0}")]
    BaselineMissing(Kind),

    /// The package ID is not safe to use as a storage key.
    #[error("invalid package id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    /// A stored document exists but cannot be decoded.
    #[error("corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding in-memory state was poisoned.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
