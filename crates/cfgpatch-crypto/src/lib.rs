//! Canonical encoding and content fingerprints for cfgpatch.
//!
//! Two logically equal JSON values always produce the same canonical bytes,
//! regardless of the key order they were built with. Equality checks and
//! baseline fingerprints both go through the same encoder so they can never
//! disagree.
//!
//! All hashing wraps an established library; there is no custom cryptography.

pub mod canonical;
pub mod hasher;

pub use canonical::{canonical_bytes, canonical_string};
pub use hasher::{ContentHasher, HasherError};
