use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unsupported kind: {0}")]
    UnsupportedKind(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
