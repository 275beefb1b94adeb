use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A non-fatal, per-entry problem detected while applying a change set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Conflict {
    /// An add targeted an ID already present in the target.
    AddExists { id: String },
    /// An update targeted an ID absent from the target.
    UpdateMissing { id: String },
    /// The target entry for an update is not a record.
    UpdateNotObject { id: String },
    /// The field's current value disagrees with the change's recorded prior value.
    #[serde(rename = "conflict")]
    Field {
        id: String,
        field: String,
        current: Value,
        expected: Value,
    },
}

impl Conflict {
    /// Entity ID the conflict refers to.
    pub fn id(&self) -> &str {
        match self {
            Conflict::AddExists { id }
            | Conflict::UpdateMissing { id }
            | Conflict::UpdateNotObject { id }
            | Conflict::Field { id, .. } => id,
        }
    }

    /// Wire name of the conflict type.
    pub fn kind(&self) -> &'static str {
        match self {
            Conflict::AddExists { .. } => "add_exists",
            Conflict::UpdateMissing { .. } => "update_missing",
            Conflict::UpdateNotObject { .. } => "update_not_object",
            Conflict::Field { .. } => "conflict",
        }
    }
}

/// Counters for what an apply call actually changed.
///
/// `updates_applied` counts fields, not entities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyStats {
    pub adds_applied: usize,
    pub updates_applied: usize,
    pub deletes_applied: usize,
}

/// Malformed change-set entries dropped during lenient parsing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub adds: usize,
    pub updates: usize,
    pub deletes: usize,
    pub fields: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.adds + self.updates + self.deletes + self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
