use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Diff(#[from] cfgpatch_diff::DiffError),

    #[error(transparent)]
    Merge(#[from] cfgpatch_merge::MergeError),

    #[error("store error: {0}")]
    Store(#[from] cfgpatch_store::StoreError),

    #[error("hash error: {0}")]
    Hasher(#[from] cfgpatch_crypto::HasherError),

    #[error(transparent)]
    Type(#[from] cfgpatch_types::TypeError),

    #[error("invalid package {id}: {reason}")]
    InvalidPackage { id: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
