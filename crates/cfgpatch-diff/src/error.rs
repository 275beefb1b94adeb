//! Error types for the diff crate.

use cfgpatch_types::Kind;

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    /// The kind string names no known dataset category.
    #[error("unsupported kind: {0}")]
    UnsupportedKind(String),

    /// The dataset's physical shape does not match its kind.
    #[error("malformed {kind} dataset: {reason}")]
    MalformedDataset { kind: Kind, reason: String },
}

impl DiffError {
    pub(crate) fn malformed(kind: Kind, reason: impl Into<String>) -> Self {
        DiffError::MalformedDataset {
            kind,
            reason: reason.into(),
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
