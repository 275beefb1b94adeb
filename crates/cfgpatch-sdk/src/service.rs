use cfgpatch_crypto::ContentHasher;
use cfgpatch_diff::{diff_datasets, parse_kind};
use cfgpatch_merge::{apply_patch, ApplyOutcome};
use cfgpatch_store::{BaselineProvider, SnapshotStore};
use cfgpatch_types::{DiffEnvelope, DiffMeta, Kind};
use serde_json::Value;
use tracing::debug;

use crate::error::SdkResult;
use crate::migration::{migrate, MigrationReport};

/// Diff and apply operations over a baseline provider.
///
/// Kind strings are resolved before any baseline is loaded, so an unknown
/// kind never touches storage.
pub struct PatchService<B> {
    baselines: B,
}

impl<B: BaselineProvider> PatchService<B> {
    pub fn new(baselines: B) -> Self {
        Self { baselines }
    }

    pub fn baselines(&self) -> &B {
        &self.baselines
    }

    /// Diff `edited` against the current baseline of `kind`.
    pub fn diff(&self, kind: &str, edited: &Value) -> SdkResult<DiffEnvelope> {
        let kind = parse_kind(kind)?;
        let baseline = self.baselines.baseline(kind)?;
        diff_envelope(kind, &baseline, edited)
    }

    /// Apply `patch` to `target`, or to a copy of the current baseline when
    /// no target is given.
    pub fn apply(&self, kind: &str, patch: &Value, target: Option<Value>) -> SdkResult<ApplyOutcome> {
        let kind = parse_kind(kind)?;
        let target = match target {
            Some(target) => target,
            None => self.baselines.baseline(kind)?,
        };
        let outcome = apply_patch(patch, target, kind)?;
        debug!(
            %kind,
            adds = outcome.stats.adds_applied,
            updates = outcome.stats.updates_applied,
            deletes = outcome.stats.deletes_applied,
            conflicts = outcome.conflicts.len(),
            "patch applied"
        );
        Ok(outcome)
    }

    /// Fingerprint of the current baseline of `kind`.
    pub fn fingerprint(&self, kind: &str) -> SdkResult<String> {
        let kind = parse_kind(kind)?;
        let baseline = self.baselines.baseline(kind)?;
        Ok(ContentHasher::fingerprint(&baseline)?)
    }

    /// Rewrite legacy packages in `store` against these baselines.
    pub fn migrate<S: SnapshotStore + ?Sized>(&self, store: &S) -> SdkResult<MigrationReport> {
        migrate(store, &self.baselines)
    }
}

/// Diff two datasets of `kind` and wrap the result with the baseline's
/// fingerprint.
pub fn diff_envelope(kind: Kind, baseline: &Value, edited: &Value) -> SdkResult<DiffEnvelope> {
    let changes = diff_datasets(kind, baseline, edited)?;
    let base_sha256 = ContentHasher::fingerprint(baseline)?;
    Ok(DiffEnvelope {
        meta: DiffMeta::new(kind, base_sha256),
        changes,
    })
}
