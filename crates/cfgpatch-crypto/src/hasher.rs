use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::canonical_bytes;

/// SHA-256 content hasher over canonical JSON.
///
/// The fingerprint of a dataset depends only on its logical content: key
/// order and whitespace never change it, and it is stable across process
/// restarts. Callers compare fingerprints to decide whether a change set was
/// computed against the baseline they currently hold.
pub struct ContentHasher;

impl ContentHasher {
    /// Hex-encoded SHA-256 of the canonical encoding of `value`.
    pub fn fingerprint(value: &Value) -> Result<String, HasherError> {
        let bytes = canonical_bytes(value)?;
        Ok(Self::hash_hex(&bytes))
    }

    /// Hex-encoded SHA-256 of raw bytes.
    pub fn hash_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Raw SHA-256 of raw bytes.
    pub fn raw_hash(data: &[u8]) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&Sha256::digest(data));
        out
    }

    /// Check a dataset against a previously recorded fingerprint.
    pub fn verify(value: &Value, expected: &str) -> bool {
        match Self::fingerprint(value) {
            Ok(actual) => actual.eq_ignore_ascii_case(expected),
            Err(_) => false,
        }
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
