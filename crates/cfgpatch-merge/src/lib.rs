//! Patch engine for cfgpatch.
//!
//! Applies a change set to a target collection of the same kind: deletes
//! first, then adds, then updates. Problems with individual entries never
//! abort the call; they are reported as [`Conflict`](cfgpatch_types::Conflict)
//! records so callers can judge success from the outcome.
//!
//! Change sets arriving over the wire are parsed leniently by
//! [`parse_change_set`]: malformed entries are dropped and counted rather
//! than rejected.

pub mod apply;
pub mod error;
pub mod parse;

pub use apply::{apply_changes, apply_patch, ApplyOutcome};
pub use error::{MergeError, MergeResult};
pub use parse::{parse_change_set, ParsedChanges};
