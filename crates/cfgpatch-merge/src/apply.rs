//! Conflict-aware change-set application.
//!
//! Order is fixed: deletes, then adds, then updates. Deleting first frees IDs
//! so a same-ID add in the same change set does not collide.
//!
//! The target is taken by value; callers that need to keep their copy clone
//! it first. The target need not derive from the baseline the change set was
//! computed against: recorded `from` values catch divergence.

use std::collections::HashMap;

use cfgpatch_diff::{extract_list_mut, reinsert, values_equal};
use cfgpatch_types::{ApplyEnvelope, ApplyStats, ChangeSet, Conflict, Kind, SkipCounts};
use serde_json::Value;
use tracing::debug;

use crate::error::MergeResult;
use crate::parse::parse_change_set;

/// Everything an apply call produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ApplyOutcome {
    /// The target with all applicable changes made.
    pub result: Value,
    pub stats: ApplyStats,
    pub conflicts: Vec<Conflict>,
    /// Malformed entries dropped before applying (lenient input only).
    pub skipped: SkipCounts,
}

impl ApplyOutcome {
    /// Returns `true` if nothing conflicted and nothing was dropped.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.skipped.is_empty()
    }

    /// Wire wrapper for the outcome.
    pub fn into_envelope(self) -> ApplyEnvelope {
        ApplyEnvelope {
            ok: true,
            result: self.result,
            stats: self.stats,
            conflicts: self.conflicts,
        }
    }
}

/// Parse `patch` leniently and apply it to `target`.
pub fn apply_patch(patch: &Value, target: Value, kind: Kind) -> MergeResult<ApplyOutcome> {
    let parsed = parse_change_set(patch);
    if !parsed.skipped.is_empty() {
        debug!(
            %kind,
            adds = parsed.skipped.adds,
            updates = parsed.skipped.updates,
            deletes = parsed.skipped.deletes,
            fields = parsed.skipped.fields,
            "skipped malformed change-set entries"
        );
    }
    let mut outcome = apply_changes(&parsed.changes, target, kind)?;
    outcome.skipped = parsed.skipped;
    Ok(outcome)
}

/// Apply a typed change set to `target`.
///
/// Fails only when `target` does not have the physical shape of `kind`.
pub fn apply_changes(
    changes: &ChangeSet,
    mut target: Value,
    kind: Kind,
) -> MergeResult<ApplyOutcome> {
    let mut items = std::mem::take(extract_list_mut(kind, &mut target)?);

    let mut stats = ApplyStats::default();
    let mut conflicts = Vec::new();
    let mut positions = position_index(&items);

    for delete in &changes.deletes {
        let Some(&idx) = positions.get(delete.id.as_str()) else {
            continue;
        };
        items.remove(idx);
        // Removal shifts every later position.
        positions = position_index(&items);
        stats.deletes_applied += 1;
    }

    for add in &changes.adds {
        if positions.contains_key(add.id.as_str()) {
            conflicts.push(Conflict::AddExists { id: add.id.clone() });
            continue;
        }
        items.push(Value::Object(add.data.clone()));
        positions.insert(add.id.clone(), items.len() - 1);
        stats.adds_applied += 1;
    }

    for update in &changes.updates {
        let Some(&idx) = positions.get(update.id.as_str()) else {
            conflicts.push(Conflict::UpdateMissing { id: update.id.clone() });
            continue;
        };
        let Some(record) = items.get_mut(idx).and_then(Value::as_object_mut) else {
            conflicts.push(Conflict::UpdateNotObject { id: update.id.clone() });
            continue;
        };

        for (field, change) in &update.fields {
            if let Some(expected) = change.expected() {
                let current = record.get(field);
                let matches = current.is_some_and(|c| values_equal(c, expected));
                if !matches {
                    conflicts.push(Conflict::Field {
                        id: update.id.clone(),
                        field: field.clone(),
                        current: current.cloned().unwrap_or(Value::Null),
                        expected: expected.clone(),
                    });
                    continue;
                }
            }
            match &change.to {
                Some(to) => {
                    record.insert(field.clone(), to.clone());
                }
                None => {
                    record.remove(field);
                }
            }
            stats.updates_applied += 1;
        }
    }

    debug!(
        %kind,
        adds = stats.adds_applied,
        updates = stats.updates_applied,
        deletes = stats.deletes_applied,
        conflicts = conflicts.len(),
        "change set applied"
    );

    Ok(ApplyOutcome {
        result: reinsert(kind, target, items)?,
        stats,
        conflicts,
        skipped: SkipCounts::default(),
    })
}

// Any string ID is addressable here, the empty one included; the diff side
// ignores empty IDs. Later duplicates win.
fn position_index(items: &[Value]) -> HashMap<String, usize> {
    let mut positions = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if let Some(id) = item.get("ID").and_then(Value::as_str) {
            positions.insert(id.to_string(), i);
        }
    }
    positions
}
