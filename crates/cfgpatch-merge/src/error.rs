//! Error types for the merge crate.

use cfgpatch_diff::DiffError;

/// Fatal errors from an apply call.
///
/// Per-entry problems are not errors; they surface as conflicts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MergeError {
    /// The target dataset could not be resolved for its kind.
    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
