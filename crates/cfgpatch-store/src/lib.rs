//! Storage collaborators for cfgpatch.
//!
//! The diff and patch engines never touch persistence. This crate holds the
//! two narrow interfaces they are fed through, plus backends:
//!
//! - [`BaselineProvider`] -- the canonical current dataset per kind
//! - [`SnapshotStore`] -- shared packages, their summary index, and one-shot
//!   job markers
//!
//! # Backends
//!
//! - [`InMemoryBaselines`] / [`InMemorySnapshotStore`] -- for tests and embedding
//! - [`DirectoryBaselines`] -- one JSON file per kind in a directory
//! - [`FileSnapshotStore`] -- `index.json` plus one `<id>.json` per package
//!
//! # Design Rules
//!
//! 1. Baselines are handed out as owned copies; callers cannot mutate the source.
//! 2. Package IDs are validated before they are turned into paths.
//! 3. File writes go through a temporary file and an atomic rename.
//! 4. The summary index is read-modify-written without versioning, so a
//!    single writer is assumed.

pub mod error;
pub mod file;
pub mod ids;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::{DirectoryBaselines, FileSnapshotStore};
pub use ids::validate_share_id;
pub use memory::{InMemoryBaselines, InMemorySnapshotStore};
pub use traits::{BaselineProvider, SnapshotStore};
