//! Equality oracle shared by diff and conflict detection.

use cfgpatch_crypto::canonical_bytes;
use serde_json::Value;

/// Structural equality independent of object key order.
///
/// When either side is a record or a list both are compared through their
/// canonical encoding; if encoding fails the plain value comparison decides.
/// Scalars use ordinary value equality.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if is_structural(a) || is_structural(b) {
        return match (canonical_bytes(a), canonical_bytes(b)) {
            (Ok(ca), Ok(cb)) => ca == cb,
            _ => a == b,
        };
    }
    a == b
}

/// Equality of two optional field values.
///
/// An absent field equals only another absent field; it is not the same as
/// an explicit `null`.
pub fn fields_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => values_equal(a, b),
        _ => false,
    }
}

fn is_structural(v: &Value) -> bool {
    matches!(v, Value::Object(_) | Value::Array(_))
}
