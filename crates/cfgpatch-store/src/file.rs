//! Directory-backed storage.
//!
//! Layout of a share directory:
//!
//! ```text
//! <dir>/index.json        {"items": [SummaryRecord, ...]}
//! <dir>/<id>.json         one package per ID
//! <dir>/.<name>.done      completion marker of a one-shot job
//! ```
//!
//! Baseline directories hold one file per kind, named by
//! [`Kind::baseline_file`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use cfgpatch_types::{Kind, PatchPackage, StoredSnapshot, SummaryRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::ids::validate_share_id;
use crate::traits::{BaselineProvider, SnapshotStore};

const INDEX_FILE: &str = "index.json";

/// Baselines read from `<dir>/<Kind::baseline_file()>` on every call.
#[derive(Clone, Debug)]
pub struct DirectoryBaselines {
    dir: PathBuf,
}

impl DirectoryBaselines {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl BaselineProvider for DirectoryBaselines {
    fn baseline(&self, kind: Kind) -> StoreResult<Value> {
        let path = self.dir.join(kind.baseline_file());
        if !path.is_file() {
            return Err(StoreError::BaselineMissing(kind));
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            id: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct IndexFile {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Serialize)]
struct IndexFileRef<'a> {
    items: &'a [Value],
}

/// Share packages stored as JSON files in one directory.
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Open a share directory, creating it and an empty index if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let store = Self { dir };
        if !store.index_path().exists() {
            store.write_index(&[])?;
        }
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn package_path(&self, id: &str) -> StoreResult<PathBuf> {
        validate_share_id(id)?;
        Ok(self.dir.join(format!("{id}.json")))
    }

    fn marker_path(&self, name: &str) -> StoreResult<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId {
                id: name.to_string(),
                reason: "marker names are [A-Za-z0-9_-]+".into(),
            });
        }
        Ok(self.dir.join(format!(".{name}.done")))
    }

    /// Index entries exactly as stored, parseable or not.
    fn read_index(&self) -> StoreResult<Vec<Value>> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path)?;
        let raw: IndexFile = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            id: INDEX_FILE.to_string(),
            reason: e.to_string(),
        })?;
        Ok(raw.items)
    }

    fn write_index(&self, items: &[Value]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(&IndexFileRef { items })?;
        write_atomic(&self.index_path(), &bytes)
    }
}

impl SnapshotStore for FileSnapshotStore {
    /// Entries without a string `id` are skipped here but stay in the index.
    fn list(&self) -> StoreResult<Vec<SummaryRecord>> {
        let items = self.read_index()?;
        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<SummaryRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => warn!("skipping malformed index entry: {}", e),
            }
        }
        Ok(records)
    }

    fn read(&self, id: &str) -> StoreResult<StoredSnapshot> {
        let path = self.package_path(id)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let bytes = fs::read(&path)?;
        let corrupt = |reason: String| StoreError::Corrupt {
            id: id.to_string(),
            reason,
        };
        let document: Value = serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;
        StoredSnapshot::from_value(document).map_err(|e| corrupt(e.to_string()))
    }

    fn write(&self, id: &str, package: &PatchPackage) -> StoreResult<u64> {
        let path = self.package_path(id)?;
        let bytes = serde_json::to_vec_pretty(package)?;
        write_atomic(&path, &bytes)?;
        debug!(id, size = bytes.len(), "package written");
        Ok(bytes.len() as u64)
    }

    /// Merge `record` into the entry with the same `id`. Other entries, and
    /// keys the record leaves unset, are written back as they were read.
    fn update_summary(&self, record: &SummaryRecord) -> StoreResult<()> {
        let mut items = self.read_index()?;
        let slot = items
            .iter_mut()
            .find(|item| item.get("id").and_then(Value::as_str) == Some(record.id.as_str()))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
        if let Value::Object(fields) = serde_json::to_value(record)? {
            slot.extend(fields);
        }
        self.write_index(&items)
    }

    fn has_marker(&self, name: &str) -> StoreResult<bool> {
        Ok(self.marker_path(name)?.exists())
    }

    fn set_marker(&self, name: &str) -> StoreResult<()> {
        write_atomic(&self.marker_path(name)?, b"ok")
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
