//! Shape resolution: locate the entity list inside a dataset and put it back.
//!
//! A dataset is either a wrapper object holding the list under a kind-specific
//! key (object_list) or the list itself (array_root). Sibling properties of a
//! wrapper are never inspected and are preserved on reinsertion.

use cfgpatch_types::{Kind, Shape};
use serde_json::Value;

use crate::error::{DiffError, DiffResult};

/// Parse a kind string (case-insensitive).
pub fn parse_kind(kind: &str) -> DiffResult<Kind> {
    kind.parse::<Kind>()
        .map_err(|_| DiffError::UnsupportedKind(kind.to_string()))
}

/// Resolve a kind string to its kind and container shape.
pub fn resolve(kind: &str) -> DiffResult<(Kind, Shape)> {
    let kind = parse_kind(kind)?;
    Ok((kind, kind.shape()))
}

/// Borrow the entity list of `dataset`.
pub fn extract_list(kind: Kind, dataset: &Value) -> DiffResult<&Vec<Value>> {
    match kind.shape() {
        Shape::ObjectList { list_key } => {
            let obj = dataset
                .as_object()
                .ok_or_else(|| DiffError::malformed(kind, "dataset must be an object"))?;
            match obj.get(list_key) {
                Some(Value::Array(list)) => Ok(list),
                Some(_) => Err(DiffError::malformed(
                    kind,
                    format!("property {list_key} must be a list"),
                )),
                None => Err(DiffError::malformed(
                    kind,
                    format!("missing {list_key} list"),
                )),
            }
        }
        Shape::ArrayRoot => dataset
            .as_array()
            .ok_or_else(|| DiffError::malformed(kind, "dataset must be an array")),
    }
}

/// Mutably borrow the entity list of `dataset`.
pub fn extract_list_mut(kind: Kind, dataset: &mut Value) -> DiffResult<&mut Vec<Value>> {
    match kind.shape() {
        Shape::ObjectList { list_key } => {
            let obj = dataset
                .as_object_mut()
                .ok_or_else(|| DiffError::malformed(kind, "dataset must be an object"))?;
            match obj.get_mut(list_key) {
                Some(Value::Array(list)) => Ok(list),
                Some(_) => Err(DiffError::malformed(
                    kind,
                    format!("property {list_key} must be a list"),
                )),
                None => Err(DiffError::malformed(
                    kind,
                    format!("missing {list_key} list"),
                )),
            }
        }
        Shape::ArrayRoot => dataset
            .as_array_mut()
            .ok_or_else(|| DiffError::malformed(kind, "dataset must be an array")),
    }
}

/// Replace the entity list of `dataset` with `list`.
///
/// For object_list the wrapper is returned with only the list key replaced;
/// for array_root the list itself becomes the dataset.
pub fn reinsert(kind: Kind, dataset: Value, list: Vec<Value>) -> DiffResult<Value> {
    match kind.shape() {
        Shape::ObjectList { list_key } => match dataset {
            Value::Object(mut obj) => {
                obj.insert(list_key.to_string(), Value::Array(list));
                Ok(Value::Object(obj))
            }
            _ => Err(DiffError::malformed(kind, "dataset must be an object")),
        },
        Shape::ArrayRoot => Ok(Value::Array(list)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgpatch_types::ShapeMode;
    use serde_json::json;

    #[test]
    fn resolve_known_kinds() {
        let (kind, shape) = resolve("Card").unwrap();
        assert_eq!(kind, Kind::Card);
        assert_eq!(shape.mode(), ShapeMode::ObjectList);
        assert_eq!(shape.list_key(), Some("Cards"));

        let (_, shape) = resolve("mapevent").unwrap();
        assert_eq!(shape.mode(), ShapeMode::ArrayRoot);
        assert_eq!(shape.list_key(), None);
    }

    #[test]
    fn resolve_unknown_kind() {
        assert_eq!(resolve("weapon"), Err(DiffError::UnsupportedKind("weapon".into())));
    }

    #[test]
    fn extract_object_list() {
        let data = json!({"Name": "base", "Cards": [{"ID": "a"}]});
        let list = extract_list(Kind::Card, &data).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn extract_array_root() {
        let data = json!([{"ID": "e1"}, {"ID": "e2"}]);
        assert_eq!(extract_list(Kind::BeginEffect, &data).unwrap().len(), 2);
    }

    #[test]
    fn extract_rejects_wrong_physical_type() {
        let err = extract_list(Kind::Card, &json!([])).unwrap_err();
        assert!(matches!(err, DiffError::MalformedDataset { kind: Kind::Card, .. }));

        let err = extract_list(Kind::MapEvent, &json!({})).unwrap_err();
        assert!(matches!(err, DiffError::MalformedDataset { kind: Kind::MapEvent, .. }));
    }

    #[test]
    fn extract_rejects_missing_or_non_list_key() {
        let err = extract_list(Kind::Pendant, &json!({"Name": "p"})).unwrap_err();
        assert_eq!(err, DiffError::malformed(Kind::Pendant, "missing Pendant list"));

        let err = extract_list(Kind::Pendant, &json!({"Pendant": {"ID": "x"}})).unwrap_err();
        assert_eq!(err, DiffError::malformed(Kind::Pendant, "property Pendant must be a list"));
    }

    #[test]
    fn extract_mut_edits_in_place() {
        let mut data = json!({"Name": "base", "Cards": []});
        extract_list_mut(Kind::Card, &mut data).unwrap().push(json!({"ID": "z"}));
        assert_eq!(data["Cards"], json!([{"ID": "z"}]));
    }

    #[test]
    fn reinsert_preserves_siblings() {
        let data = json!({"Name": "base", "Version": 3, "Cards": [{"ID": "a"}]});
        let out = reinsert(Kind::Card, data, vec![json!({"ID": "b"})]).unwrap();
        assert_eq!(out, json!({"Name": "base", "Version": 3, "Cards": [{"ID": "b"}]}));
    }

    #[test]
    fn reinsert_array_root_returns_list() {
        let out = reinsert(Kind::MapEvent, json!([1, 2]), vec![json!({"ID": "m"})]).unwrap();
        assert_eq!(out, json!([{"ID": "m"}]));
    }
}
