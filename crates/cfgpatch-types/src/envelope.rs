//! Wire wrappers around diff and apply results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::change::ChangeSet;
use crate::kind::Kind;
use crate::outcome::{ApplyStats, Conflict};

/// Current schema version stamped into every [`DiffMeta`].
pub const DIFF_SCHEMA_VERSION: u32 = 1;

/// Provenance of a change set: which kind it targets and which baseline it
/// was computed against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffMeta {
    pub schema: u32,
    pub kind: Kind,
    pub base_sha256: String,
}

impl DiffMeta {
    pub fn new(kind: Kind, base_sha256: impl Into<String>) -> Self {
        Self {
            schema: DIFF_SCHEMA_VERSION,
            kind,
            base_sha256: base_sha256.into(),
        }
    }
}

/// `{"meta": …, "changes": …}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffEnvelope {
    pub meta: DiffMeta,
    pub changes: ChangeSet,
}

/// `{"ok": true, "result": …, "stats": …, "conflicts": […]}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplyEnvelope {
    pub ok: bool,
    pub result: Value,
    pub stats: ApplyStats,
    pub conflicts: Vec<Conflict>,
}
