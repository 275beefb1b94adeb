//! Change-set wire types.
//!
//! A [`ChangeSet`] is an immutable, replayable artifact: it can be stored,
//! transmitted, and applied to any number of targets. Each list is sorted by
//! entity ID when produced by the diff engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The add/update/delete delta between two versions of a collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub adds: Vec<AddEntry>,
    #[serde(default)]
    pub updates: Vec<UpdateEntry>,
    #[serde(default)]
    pub deletes: Vec<DeleteEntry>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the change set carries no entries.
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Total number of entries across all three lists.
    pub fn len(&self) -> usize {
        self.adds.len() + self.updates.len() + self.deletes.len()
    }

    /// Total number of field changes across all updates.
    pub fn field_changes(&self) -> usize {
        self.updates.iter().map(|u| u.fields.len()).sum()
    }
}

/// A new entity, carried whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddEntry {
    pub id: String,
    pub data: Map<String, Value>,
}

/// Field-level replacements for one existing entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntry {
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldChange>,
}

/// Removal of one entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEntry {
    pub id: String,
}

/// Whole-value replacement of a single field.
///
/// `None` means the field is absent on that side; it is omitted from the wire
/// object. `Some(Value::Null)` is an explicit null and is serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub from: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub to: Option<Value>,
}

impl FieldChange {
    pub fn new(from: Option<Value>, to: Option<Value>) -> Self {
        Self { from, to }
    }

    /// The prior value the apply step must verify, if any.
    ///
    /// An absent or explicit-null `from` carries no expectation.
    pub fn expected(&self) -> Option<&Value> {
        self.from.as_ref().filter(|v| !v.is_null())
    }
}

// A present key always yields `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
