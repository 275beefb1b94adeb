//! Share package ID validation.
//!
//! Valid IDs:
//! - 6 to 24 characters
//! - ASCII letters, digits, and `-` only
//!
//! IDs become file names, so anything else (path separators, dots) is refused.

use crate::error::{StoreError, StoreResult};

const MIN_LEN: usize = 6;
const MAX_LEN: usize = 24;

/// Validate a share package ID, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use cfgpatch_store::validate_share_id;
///
/// assert!(validate_share_id("a1B2-c3").is_ok());
/// assert!(validate_share_id("short").is_err());
/// assert!(validate_share_id("../../etc/passwd").is_err());
/// ```
pub fn validate_share_id(id: &str) -> StoreResult<()> {
    let len = id.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return Err(StoreError::InvalidId {
            id: id.to_string(),
            reason: format!("length must be {MIN_LEN}..={MAX_LEN}, got {len}"),
        });
    }

    if let Some(ch) = id.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
        return Err(StoreError::InvalidId {
            id: id.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }

    Ok(())
}
