//! In-memory backends for testing and embedding.
//!
//! Both types keep their state behind `RwLock`s and implement the full
//! storage traits. Data is lost when the store is dropped.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cfgpatch_types::{Kind, PatchPackage, StoredSnapshot, SummaryRecord};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::ids::validate_share_id;
use crate::traits::{BaselineProvider, SnapshotStore};

fn read_lock<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|e| StoreError::LockPoisoned(e.to_string()))
}

fn write_lock<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|e| StoreError::LockPoisoned(e.to_string()))
}

/// Baselines held in a map keyed by kind.
#[derive(Debug, Default)]
pub struct InMemoryBaselines {
    datasets: RwLock<HashMap<Kind, Value>>,
}

impl InMemoryBaselines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Owning `self` rules out other lock holders, so
    /// a poisoned map is recovered rather than skipped.
    pub fn with(mut self, kind: Kind, dataset: Value) -> Self {
        self.datasets
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, dataset);
        self
    }

    /// Replace the baseline for `kind`.
    pub fn set(&self, kind: Kind, dataset: Value) -> StoreResult<()> {
        write_lock(&self.datasets)?.insert(kind, dataset);
        Ok(())
    }
}

impl BaselineProvider for InMemoryBaselines {
    fn baseline(&self, kind: Kind) -> StoreResult<Value> {
        read_lock(&self.datasets)?
            .get(&kind)
            .cloned()
            .ok_or(StoreError::BaselineMissing(kind))
    }
}

/// Packages, index, and markers held in memory.
///
/// Packages are kept as raw JSON documents so tests can seed legacy,
/// patch-form, and corrupt packages alike.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    documents: RwLock<BTreeMap<String, Value>>,
    index: RwLock<Vec<SummaryRecord>>,
    markers: RwLock<BTreeSet<String>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a package document and its summary record.
    pub fn insert(&self, record: SummaryRecord, document: Value) -> StoreResult<()> {
        validate_share_id(&record.id)?;
        write_lock(&self.documents)?.insert(record.id.clone(), document);
        let mut index = write_lock(&self.index)?;
        index.retain(|r| r.id != record.id);
        index.push(record);
        Ok(())
    }

    /// The raw stored document for `id`, if any.
    pub fn document(&self, id: &str) -> StoreResult<Option<Value>> {
        Ok(read_lock(&self.documents)?.get(id).cloned())
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn list(&self) -> StoreResult<Vec<SummaryRecord>> {
        Ok(read_lock(&self.index)?.clone())
    }

    fn read(&self, id: &str) -> StoreResult<StoredSnapshot> {
        let document = read_lock(&self.documents)?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        StoredSnapshot::from_value(document).map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    fn write(&self, id: &str, package: &PatchPackage) -> StoreResult<u64> {
        validate_share_id(id)?;
        let bytes = serde_json::to_vec_pretty(package)?;
        let document = serde_json::to_value(package)?;
        write_lock(&self.documents)?.insert(id.to_string(), document);
        Ok(bytes.len() as u64)
    }

    fn update_summary(&self, record: &SummaryRecord) -> StoreResult<()> {
        let mut index = write_lock(&self.index)?;
        let slot = index
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
        *slot = record.clone();
        Ok(())
    }

    fn has_marker(&self, name: &str) -> StoreResult<bool> {
        Ok(read_lock(&self.markers)?.contains(name))
    }

    fn set_marker(&self, name: &str) -> StoreResult<()> {
        write_lock(&self.markers)?.insert(name.to_string());
        Ok(())
    }
}
