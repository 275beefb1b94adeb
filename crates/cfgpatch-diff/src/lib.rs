//! Diff engine for cfgpatch.
//!
//! Canonicalizes heterogeneous dataset shapes into an entity-keyed form and
//! computes the add/update/delete change set between two collections of the
//! same kind.
//!
//! # Key Items
//!
//! - [`resolve`] / [`extract_list`] / [`reinsert`] -- Shape resolution per kind
//! - [`index_entities`] / [`EntityMap`] -- ID-keyed view over an entity list
//! - [`values_equal`] -- Key-order-insensitive equality
//! - [`diff_entities`] / [`diff_datasets`] -- Change set generation

pub mod entity_diff;
pub mod entity_index;
pub mod equal;
pub mod error;
pub mod shape;

pub use entity_diff::{diff_datasets, diff_entities};
pub use entity_index::{entity_id, index_entities, EntityMap};
pub use equal::{fields_equal, values_equal};
pub use error::{DiffError, DiffResult};
pub use shape::{extract_list, extract_list_mut, parse_kind, reinsert, resolve};
