//! Entity-level diff: compare two ID-keyed collections.
//!
//! IDs only in the edited side become adds (full copy of the entity), IDs
//! only in the baseline become deletes, and IDs on both sides become updates
//! listing each differing field with its before and after value. Field
//! updates are whole-value replacements; nested structures are never walked.
//!
//! Output lists are sorted by ID, so the result depends only on the content
//! of the inputs and never on their iteration order.

use std::collections::{BTreeMap, BTreeSet};

use cfgpatch_types::{AddEntry, ChangeSet, DeleteEntry, FieldChange, Kind, UpdateEntry};
use serde_json::{Map, Value};
use tracing::debug;

use crate::entity_index::{index_entities, EntityMap};
use crate::equal::fields_equal;
use crate::error::DiffResult;
use crate::shape::extract_list;

/// Compute the change set turning `base` into `edited`.
pub fn diff_entities(base: &EntityMap<'_>, edited: &EntityMap<'_>) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for (id, entity) in edited {
        if !base.contains_key(id) {
            changes.adds.push(AddEntry {
                id: (*id).to_string(),
                data: (*entity).clone(),
            });
        }
    }

    for id in base.keys() {
        if !edited.contains_key(id) {
            changes.deletes.push(DeleteEntry {
                id: (*id).to_string(),
            });
        }
    }

    for (id, before) in base {
        let Some(after) = edited.get(id) else {
            continue;
        };
        let fields = diff_fields(before, after);
        if !fields.is_empty() {
            changes.updates.push(UpdateEntry {
                id: (*id).to_string(),
                fields,
            });
        }
    }

    changes
}

/// Resolve both datasets for `kind` and diff their entity collections.
pub fn diff_datasets(kind: Kind, baseline: &Value, edited: &Value) -> DiffResult<ChangeSet> {
    let base_list = extract_list(kind, baseline)?;
    let edited_list = extract_list(kind, edited)?;

    let base_map = index_entities(base_list);
    let edited_map = index_entities(edited_list);
    let changes = diff_entities(&base_map, &edited_map);

    debug!(
        %kind,
        base = base_map.len(),
        edited = edited_map.len(),
        adds = changes.adds.len(),
        updates = changes.updates.len(),
        deletes = changes.deletes.len(),
        "diff computed"
    );
    Ok(changes)
}

fn diff_fields(
    before: &Map<String, Value>,
    after: &Map<String, Value>,
) -> BTreeMap<String, FieldChange> {
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    let mut fields = BTreeMap::new();
    for key in keys {
        if key == "ID" {
            continue;
        }
        let b = before.get(key);
        let a = after.get(key);
        if fields_equal(b, a) {
            continue;
        }
        fields.insert(key.clone(), FieldChange::new(b.cloned(), a.cloned()));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn diff_lists(base: Value, edited: Value) -> ChangeSet {
        diff_datasets(Kind::MapEvent, &base, &edited).unwrap()
    }

    #[test]
    fn reference_scenario() {
        let changes = diff_lists(
            json!([{"ID": "a", "hp": 10}, {"ID": "b", "hp": 5}]),
            json!([{"ID": "a", "hp": 12}, {"ID": "c", "hp": 3}]),
        );
        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            json!({
                "adds": [{"id": "c", "data": {"ID": "c", "hp": 3}}],
                "updates": [{"id": "a", "fields": {"hp": {"from": 10, "to": 12}}}],
                "deletes": [{"id": "b"}],
            })
        );
    }

    #[test]
    fn identical_collections_no_changes() {
        let data = json!([{"ID": "a", "hp": 1, "tags": ["x", "y"]}]);
        assert!(diff_lists(data.clone(), data).is_empty());
    }

    #[test]
    fn reordered_nested_keys_are_not_updates() {
        let base: Value = serde_json::from_str(r#"[{"ID": "a", "cost": {"gold": 1, "wood": 2}}]"#).unwrap();
        let edited: Value = serde_json::from_str(r#"[{"cost": {"wood": 2, "gold": 1}, "ID": "a"}]"#).unwrap();
        assert!(diff_lists(base, edited).is_empty());
    }

    #[test]
    fn lists_sorted_by_id() {
        let changes = diff_lists(
            json!([{"ID": "z"}, {"ID": "y"}, {"ID": "m", "v": 1}, {"ID": "k", "v": 1}]),
            json!([{"ID": "c"}, {"ID": "b"}, {"ID": "m", "v": 2}, {"ID": "k", "v": 2}]),
        );
        let adds: Vec<&str> = changes.adds.iter().map(|a| a.id.as_str()).collect();
        let deletes: Vec<&str> = changes.deletes.iter().map(|d| d.id.as_str()).collect();
        let updates: Vec<&str> = changes.updates.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(adds, vec!["b", "c"]);
        assert_eq!(deletes, vec!["y", "z"]);
        assert_eq!(updates, vec!["k", "m"]);
    }

    #[test]
    fn added_and_removed_fields_keep_absence() {
        let changes = diff_lists(
            json!([{"ID": "a", "old": 1, "nil": null}]),
            json!([{"ID": "a", "new": 2}]),
        );
        let fields = &changes.updates[0].fields;
        assert_eq!(fields["old"], FieldChange::new(Some(json!(1)), None));
        assert_eq!(fields["new"], FieldChange::new(None, Some(json!(2))));
        assert_eq!(fields["nil"], FieldChange::new(Some(Value::Null), None));
    }

    #[test]
    fn id_field_never_reported() {
        let base = vec![json!({"ID": "a", "v": 1})];
        let edited = vec![json!({"ID": "a", "v": 2})];
        let changes = diff_entities(&index_entities(&base), &index_entities(&edited));
        assert!(!changes.updates[0].fields.contains_key("ID"));
    }

    #[test]
    fn entities_without_id_ignored() {
        let changes = diff_lists(
            json!([{"name": "orphan"}, {"ID": "a"}]),
            json!([{"name": "other orphan"}, {"ID": "a"}, 42]),
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn object_list_kind_resolved() {
        let base = json!({"Name": "cards", "Cards": [{"ID": "a", "hp": 1}]});
        let edited = json!({"Name": "renamed", "Cards": [{"ID": "a", "hp": 1}]});
        assert!(diff_datasets(Kind::Card, &base, &edited).unwrap().is_empty());
    }

    #[test]
    fn malformed_edited_dataset_fails() {
        let base = json!({"Cards": []});
        assert!(diff_datasets(Kind::Card, &base, &json!([])).is_err());
    }

    fn entity_list() -> impl Strategy<Value = Vec<Value>> {
        prop::collection::vec(
            ("[a-e]", 0i64..4, prop::option::of(0i64..3)),
            0..8,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(id, hp, extra)| {
                    let mut entity = json!({"ID": id, "hp": hp});
                    if let Some(extra) = extra {
                        entity["extra"] = json!({"n": extra, "tag": "t"});
                    }
                    entity
                })
                .collect()
        })
    }

    /// Same collection in reverse entity order, each object rebuilt with its
    /// keys inserted back to front. Duplicate IDs are collapsed to their last
    /// occurrence first, since reversing would otherwise change which one wins.
    fn reordered(list: &[Value]) -> Value {
        let mut unique: Vec<&Value> = Vec::new();
        for entity in list {
            unique.retain(|kept| kept["ID"] != entity["ID"]);
            unique.push(entity);
        }
        let rebuilt = unique
            .into_iter()
            .rev()
            .map(|entity| match entity {
                Value::Object(fields) => Value::Object(
                    fields
                        .iter()
                        .rev()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect::<Map<String, Value>>(),
                ),
                other => other.clone(),
            })
            .collect();
        Value::Array(rebuilt)
    }

    proptest! {
        #[test]
        fn diff_is_deterministic(base in entity_list(), edited in entity_list()) {
            let first = diff_lists(Value::Array(base.clone()), Value::Array(edited.clone()));
            let second = diff_lists(reordered(&base), reordered(&edited));
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }

        #[test]
        fn adds_and_deletes_are_disjoint(base in entity_list(), edited in entity_list()) {
            let changes = diff_lists(Value::Array(base), Value::Array(edited));
            for add in &changes.adds {
                prop_assert!(changes.deletes.iter().all(|d| d.id != add.id));
            }
            prop_assert!(changes.updates.iter().all(|u| !u.fields.is_empty()));
        }
    }
}
