//! ID-keyed view over an entity list.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Entity ID to entity record, borrowed from the list it was built from.
///
/// Iteration is in ascending ID order.
pub type EntityMap<'a> = BTreeMap<&'a str, &'a Map<String, Value>>;

/// The entity's `ID` if it is a record with a non-empty string `ID`.
pub fn entity_id(value: &Value) -> Option<&str> {
    value
        .as_object()?
        .get("ID")?
        .as_str()
        .filter(|id| !id.is_empty())
}

/// Index a list by entity ID.
///
/// Non-record entries and records without a non-empty string `ID` are
/// dropped. When two records share an ID the later one wins.
pub fn index_entities(list: &[Value]) -> EntityMap<'_> {
    let mut map = EntityMap::new();
    for item in list {
        let Value::Object(record) = item else {
            continue;
        };
        if let Some(Value::String(id)) = record.get("ID") {
            if !id.is_empty() {
                map.insert(id.as_str(), record);
            }
        }
    }
    map
}
