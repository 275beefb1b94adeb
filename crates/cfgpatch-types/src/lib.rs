//! Foundation types for cfgpatch.
//!
//! This crate provides the vocabulary shared by every other cfgpatch crate:
//! the closed set of dataset kinds and their physical shapes, the change-set
//! wire format, apply outcomes, and the share-package records consumed by the
//! migration driver.
//!
//! # Key Types
//!
//! - [`Kind`] / [`Shape`] -- Dataset category and its container layout
//! - [`ChangeSet`] -- Adds, field-level updates, and deletes keyed by entity ID
//! - [`Conflict`] / [`ApplyStats`] / [`SkipCounts`] -- Per-apply outcome records
//! - [`DiffEnvelope`] / [`ApplyEnvelope`] -- Wire wrappers for diff and apply results
//! - [`StoredSnapshot`] / [`PatchPackage`] / [`SummaryRecord`] -- Shared package records

pub mod change;
pub mod envelope;
pub mod error;
pub mod kind;
pub mod outcome;
pub mod package;

pub use change::{AddEntry, ChangeSet, DeleteEntry, FieldChange, UpdateEntry};
pub use envelope::{ApplyEnvelope, DiffEnvelope, DiffMeta, DIFF_SCHEMA_VERSION};
pub use error::TypeError;
pub use kind::{Kind, Shape, ShapeMode};
pub use outcome::{ApplyStats, Conflict, SkipCounts};
pub use package::{
    LegacyPackage, PatchBody, PatchPackage, StoredSnapshot, SummaryRecord, PATCH_FORMAT,
};
