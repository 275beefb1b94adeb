//! High-level cfgpatch API.
//!
//! [`PatchService`] wraps the diff and patch engines around a
//! [`BaselineProvider`](cfgpatch_store::BaselineProvider), producing the wire
//! envelopes. [`migrate`] rewrites legacy whole-dataset share packages as
//! change sets against the current baselines.

pub mod error;
pub mod migration;
pub mod service;

pub use error::{SdkError, SdkResult};
pub use migration::{migrate, migrate_at, MigrationReport, MIGRATION_MARKER};
pub use service::{diff_envelope, PatchService};
