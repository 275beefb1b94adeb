//! Canonical JSON encoder.
//!
//! Rules:
//! - Object keys are emitted in ascending code-point order.
//! - No whitespace between tokens (`,` and `:` separators only).
//! - Strings keep non-ASCII characters verbatim; only `"`, `\` and control
//!   characters are escaped.
//! - Numbers use `serde_json`'s shortest round-trip formatting.
//!
//! The ordering does not depend on whether `serde_json` was built with
//! `preserve_order`, because keys are sorted here rather than by the map.

use std::io::Write;

use serde_json::{Map, Value};

use crate::hasher::HasherError;

/// Encode a value into canonical bytes.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, HasherError> {
    let mut out = Vec::with_capacity(64);
    write_value(&mut out, value)?;
    Ok(out)
}

/// Encode a value into a canonical string.
pub fn canonical_string(value: &Value) -> Result<String, HasherError> {
    let bytes = canonical_bytes(value)?;
    String::from_utf8(bytes).map_err(|e| HasherError::Serialization(e.to_string()))
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> Result<(), HasherError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => {
            write!(out, "{n}").map_err(|e| HasherError::Serialization(e.to_string()))?
        }
        Value::String(s) => write_str(out, s)?,
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item)?;
            }
            out.push(b']');
        }
        Value::Object(map) => write_object(out, map)?,
    }
    Ok(())
}

fn write_object(out: &mut Vec<u8>, map: &Map<String, Value>) -> Result<(), HasherError> {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    out.push(b'{');
    for (i, (key, val)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        write_str(out, key)?;
        out.push(b':');
        write_value(out, val)?;
    }
    out.push(b'}');
    Ok(())
}

fn write_str(out: &mut Vec<u8>, s: &str) -> Result<(), HasherError> {
    serde_json::to_writer(&mut *out, s).map_err(|e| HasherError::Serialization(e.to_string()))
}
