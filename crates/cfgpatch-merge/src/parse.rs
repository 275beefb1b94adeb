//! Lenient change-set parsing.
//!
//! Accepts either a bare change set or a diff envelope carrying one under
//! `changes`. Missing or non-list sections count as empty. Entries with the
//! wrong shape are skipped and counted in [`SkipCounts`].

use std::collections::BTreeMap;

use cfgpatch_types::{AddEntry, ChangeSet, DeleteEntry, FieldChange, SkipCounts, UpdateEntry};
use serde_json::{Map, Value};

/// A change set recovered from untrusted input, with what was dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedChanges {
    pub changes: ChangeSet,
    pub skipped: SkipCounts,
}

/// Parse a change set, keeping every well-formed entry.
pub fn parse_change_set(patch: &Value) -> ParsedChanges {
    let body = match patch.get("changes") {
        Some(inner @ Value::Object(_)) => inner,
        _ => patch,
    };

    let mut parsed = ParsedChanges::default();
    let Some(body) = body.as_object() else {
        return parsed;
    };

    for entry in section(body, "adds") {
        match parse_add(entry) {
            Some(add) => parsed.changes.adds.push(add),
            None => parsed.skipped.adds += 1,
        }
    }

    for entry in section(body, "updates") {
        match parse_update(entry, &mut parsed.skipped.fields) {
            Some(update) => parsed.changes.updates.push(update),
            None => parsed.skipped.updates += 1,
        }
    }

    for entry in section(body, "deletes") {
        match entry.get("id").and_then(Value::as_str) {
            Some(id) => parsed.changes.deletes.push(DeleteEntry { id: id.to_string() }),
            None => parsed.skipped.deletes += 1,
        }
    }

    parsed
}

fn section<'a>(body: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match body.get(key) {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

fn parse_add(entry: &Value) -> Option<AddEntry> {
    let id = entry.get("id")?.as_str()?;
    let data = entry.get("data")?.as_object()?;
    Some(AddEntry {
        id: id.to_string(),
        data: data.clone(),
    })
}

fn parse_update(entry: &Value, skipped_fields: &mut usize) -> Option<UpdateEntry> {
    let id = entry.get("id")?.as_str()?;
    let raw_fields = match entry.get("fields") {
        None | Some(Value::Null) => None,
        Some(Value::Object(fields)) => Some(fields),
        Some(_) => return None,
    };

    let mut fields = BTreeMap::new();
    for (name, raw) in raw_fields.into_iter().flatten() {
        let Some(change) = raw.as_object() else {
            *skipped_fields += 1;
            continue;
        };
        let from = change.get("from").cloned();
        let to = change.get("to").cloned();
        if from.is_none() && to.is_none() {
            *skipped_fields += 1;
            continue;
        }
        fields.insert(name.clone(), FieldChange::new(from, to));
    }

    Some(UpdateEntry {
        id: id.to_string(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_change_set() {
        let parsed = parse_change_set(&json!({
            "adds": [{"id": "c", "data": {"ID": "c"}}],
            "updates": [{"id": "a", "fields": {"hp": {"from": 1, "to": 2}}}],
            "deletes": [{"id": "b"}],
        }));
        assert_eq!(parsed.changes.len(), 3);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn unwraps_diff_envelope() {
        let parsed = parse_change_set(&json!({
            "meta": {"schema": 1, "kind": "card", "baseSha256": "00"},
            "changes": {"deletes": [{"id": "b"}]},
        }));
        assert_eq!(parsed.changes.deletes, vec![DeleteEntry { id: "b".into() }]);
    }

    #[test]
    fn malformed_entries_are_counted() {
        let parsed = parse_change_set(&json!({
            "adds": [{"id": 1, "data": {}}, {"id": "x", "data": []}, {"id": "y", "data": {"ID": "y"}}],
            "updates": [
                {"id": "a", "fields": []},
                {"fields": {}},
                {"id": "b", "fields": {"ok": {"to": 1}, "bad": 5, "empty": {}}},
                {"id": "c"},
            ],
            "deletes": [{"id": null}, "d", {"id": "e"}],
        }));
        assert_eq!(parsed.changes.adds.len(), 1);
        assert_eq!(parsed.changes.updates.len(), 2);
        assert_eq!(parsed.changes.updates[0].fields.len(), 1);
        assert!(parsed.changes.updates[1].fields.is_empty());
        assert_eq!(parsed.changes.deletes.len(), 1);
        assert_eq!(
            parsed.skipped,
            SkipCounts { adds: 2, updates: 2, deletes: 2, fields: 2 }
        );
    }

    #[test]
    fn non_list_sections_are_empty() {
        let parsed = parse_change_set(&json!({"adds": {"id": "x"}, "deletes": "b"}));
        assert!(parsed.changes.is_empty());
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn non_object_patch_is_empty() {
        assert!(parse_change_set(&json!([1, 2, 3])).changes.is_empty());
        assert!(parse_change_set(&Value::Null).changes.is_empty());
    }

    #[test]
    fn explicit_null_from_is_kept() {
        let parsed = parse_change_set(&json!({
            "updates": [{"id": "a", "fields": {"hp": {"from": null, "to": 3}}}],
        }));
        let change = &parsed.changes.updates[0].fields["hp"];
        assert_eq!(change.from, Some(Value::Null));
        assert!(change.expected().is_none());
    }
}
