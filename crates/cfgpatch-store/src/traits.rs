use cfgpatch_types::{Kind, PatchPackage, StoredSnapshot, SummaryRecord};
use serde_json::Value;

use crate::error::StoreResult;

/// Source of the canonical current dataset for each kind.
///
/// Implementations return an owned copy; the engine never mutates the
/// provider's data in place.
pub trait BaselineProvider: Send + Sync {
    /// The current baseline for `kind`.
    fn baseline(&self, kind: Kind) -> StoreResult<Value>;
}

impl<T: BaselineProvider + ?Sized> BaselineProvider for Box<T> {
    fn baseline(&self, kind: Kind) -> StoreResult<Value> {
        (**self).baseline(kind)
    }
}

/// Storage for shared packages and their summary index.
///
/// Implementations must be thread-safe (`Send + Sync`), but the summary index
/// is not versioned: concurrent read-modify-write cycles through
/// [`SnapshotStore::update_summary`] can lose updates. Callers that mutate in
/// bulk serialize themselves.
pub trait SnapshotStore: Send + Sync {
    /// All summary records, in index order.
    fn list(&self) -> StoreResult<Vec<SummaryRecord>>;

    /// Read and classify the package stored under `id`.
    ///
    /// Returns `Err(StoreError::NotFound)` if there is no such package and
    /// `Err(StoreError::Corrupt)` if it cannot be classified.
    fn read(&self, id: &str) -> StoreResult<StoredSnapshot>;

    /// Replace the package stored under `id`. Returns its new size in bytes.
    fn write(&self, id: &str, package: &PatchPackage) -> StoreResult<u64>;

    /// Replace the summary record with the same `id`.
    fn update_summary(&self, record: &SummaryRecord) -> StoreResult<()>;

    /// Whether the named one-shot job has completed.
    fn has_marker(&self, name: &str) -> StoreResult<bool>;

    /// Record that the named one-shot job has completed.
    fn set_marker(&self, name: &str) -> StoreResult<()>;
}
