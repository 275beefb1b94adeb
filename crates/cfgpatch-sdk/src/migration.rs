//! One-shot rewrite of legacy share packages into change sets.
//!
//! A legacy package carries whole datasets. Each known collection it holds is
//! diffed against the current baseline for its kind and the package is
//! replaced by the resulting envelope(s). The pass runs once per store: a
//! completion marker is written after it, whatever happened to individual
//! packages, and a package that failed is never retried.
//!
//! The summary index is read-modify-written without versioning. Runs inside
//! one process are serialized by a lock; separate processes sharing a store
//! are not coordinated.

use std::sync::Mutex;

use cfgpatch_store::{BaselineProvider, SnapshotStore};
use cfgpatch_types::{
    Kind, LegacyPackage, PatchBody, PatchPackage, StoredSnapshot, SummaryRecord, PATCH_FORMAT,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{SdkError, SdkResult};
use crate::service::diff_envelope;

/// Name of the completion marker in the snapshot store.
pub const MIGRATION_MARKER: &str = "patch-migration-v1";

static MIGRATION_LOCK: Mutex<()> = Mutex::new(());

/// What a migration run did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// The marker was already present; nothing was touched.
    pub already_done: bool,
    /// Packages rewritten as change sets.
    pub migrated: usize,
    /// Packages already in patch form.
    pub skipped: usize,
    /// Packages that could not be rewritten.
    pub failed: usize,
}

enum ItemOutcome {
    Migrated,
    AlreadyPatch,
}

/// Run the migration, stamping rewritten packages with the current time.
pub fn migrate<S, B>(store: &S, baselines: &B) -> SdkResult<MigrationReport>
where
    S: SnapshotStore + ?Sized,
    B: BaselineProvider + ?Sized,
{
    migrate_at(store, baselines, Utc::now())
}

/// Run the migration with an explicit `migratedAt` timestamp.
///
/// Fails only if the store cannot be listed or the marker cannot be read or
/// written. Per-package failures are logged and counted.
pub fn migrate_at<S, B>(store: &S, baselines: &B, now: DateTime<Utc>) -> SdkResult<MigrationReport>
where
    S: SnapshotStore + ?Sized,
    B: BaselineProvider + ?Sized,
{
    let _guard = MIGRATION_LOCK
        .lock()
        .map_err(|e| SdkError::Internal(format!("migration lock poisoned: {e}")))?;

    let mut report = MigrationReport::default();
    if store.has_marker(MIGRATION_MARKER)? {
        debug!(marker = MIGRATION_MARKER, "migration already done");
        report.already_done = true;
        return Ok(report);
    }

    let records = store.list()?;
    let stamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    info!(packages = records.len(), "starting share package migration");

    for record in &records {
        match migrate_one(store, baselines, record, &stamp) {
            Ok(ItemOutcome::Migrated) => report.migrated += 1,
            Ok(ItemOutcome::AlreadyPatch) => report.skipped += 1,
            Err(e) => {
                warn!(id = %record.id, "skipping package: {}", e);
                report.failed += 1;
            }
        }
    }

    store.set_marker(MIGRATION_MARKER)?;
    info!(
        migrated = report.migrated,
        skipped = report.skipped,
        failed = report.failed,
        "share package migration finished"
    );
    Ok(report)
}

fn migrate_one<S, B>(
    store: &S,
    baselines: &B,
    record: &SummaryRecord,
    stamp: &str,
) -> SdkResult<ItemOutcome>
where
    S: SnapshotStore + ?Sized,
    B: BaselineProvider + ?Sized,
{
    if record.is_patch_form() {
        return Ok(ItemOutcome::AlreadyPatch);
    }
    let legacy = match store.read(&record.id)? {
        StoredSnapshot::Patch(_) => return Ok(ItemOutcome::AlreadyPatch),
        StoredSnapshot::Legacy(legacy) => legacy,
    };

    let package = rewrite(&record.id, legacy, baselines, stamp)?;
    let size = store.write(&record.id, &package)?;

    let mut updated = record.clone();
    updated.size = Some(size);
    updated.format = Some(PATCH_FORMAT.to_string());
    store.update_summary(&updated)?;

    debug!(id = %record.id, size, "package migrated");
    Ok(ItemOutcome::Migrated)
}

fn rewrite<B>(id: &str, legacy: LegacyPackage, baselines: &B, stamp: &str) -> SdkResult<PatchPackage>
where
    B: BaselineProvider + ?Sized,
{
    let mut envelopes = Vec::new();
    for kind in Kind::ALL {
        let dataset = match legacy.data.get(kind.share_key()) {
            None | Some(Value::Null) => continue,
            Some(dataset) => dataset,
        };
        let baseline = baselines.baseline(kind)?;
        envelopes.push(diff_envelope(kind, &baseline, dataset)?);
    }

    if envelopes.is_empty() {
        return Err(SdkError::InvalidPackage {
            id: id.to_string(),
            reason: "no known data collection".into(),
        });
    }

    let mut meta = legacy.meta;
    meta.insert("format".into(), Value::String(PATCH_FORMAT.into()));
    meta.insert("migratedAt".into(), Value::String(stamp.into()));
    Ok(PatchPackage {
        meta,
        body: PatchBody::from_envelopes(envelopes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgpatch_store::{FileSnapshotStore, InMemoryBaselines, InMemorySnapshotStore};
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn baselines() -> InMemoryBaselines {
        InMemoryBaselines::new()
            .with(Kind::Card, json!({"Name": "deck", "Cards": [{"ID": "a", "hp": 1}]}))
            .with(Kind::MapEvent, json!([{"ID": "e1", "w": 1}, {"ID": "e2", "w": 2}]))
    }

    fn record(id: &str) -> SummaryRecord {
        SummaryRecord {
            id: id.to_string(),
            title: Some(format!("{id} title")),
            size: Some(999),
            downloads: Some(4),
            ..Default::default()
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn seeded_store() -> InMemorySnapshotStore {
        let store = InMemorySnapshotStore::new();
        store
            .insert(
                record("single"),
                json!({
                    "meta": {"title": "single title", "author": "me"},
                    "data": {"cards": {"Name": "deck", "Cards": [{"ID": "a", "hp": 5}]}},
                }),
            )
            .unwrap();
        store
            .insert(
                record("multi1"),
                json!({
                    "meta": {"title": "multi"},
                    "data": {
                        "mapEvents": [{"ID": "e1", "w": 1}],
                        "cards": {"Cards": [{"ID": "a", "hp": 1}, {"ID": "b", "hp": 2}]},
                    },
                }),
            )
            .unwrap();
        store
    }

    #[test]
    fn single_kind_package_gets_one_envelope() {
        let store = seeded_store();
        let report = migrate_at(&store, &baselines(), fixed_time()).unwrap();
        assert_eq!(report.migrated, 2);
        assert_eq!(report.failed, 0);

        let doc = store.document("single").unwrap().unwrap();
        assert_eq!(doc["meta"]["format"], json!("patch"));
        assert_eq!(doc["meta"]["author"], json!("me"));
        assert_eq!(doc["meta"]["migratedAt"], json!("2024-05-01T12:00:00Z"));
        assert_eq!(doc["patch"]["meta"]["kind"], json!("card"));
        assert_eq!(
            doc["patch"]["changes"]["updates"],
            json!([{"id": "a", "fields": {"hp": {"from": 1, "to": 5}}}])
        );
        assert!(doc.get("data").is_none());
    }

    #[test]
    fn multi_kind_package_lists_envelopes_in_kind_order() {
        let store = seeded_store();
        migrate_at(&store, &baselines(), fixed_time()).unwrap();

        let doc = store.document("multi1").unwrap().unwrap();
        let patches = doc["patches"].as_array().unwrap();
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0]["meta"]["kind"], json!("card"));
        assert_eq!(patches[1]["meta"]["kind"], json!("mapevent"));
        assert_eq!(patches[1]["changes"]["deletes"], json!([{"id": "e2"}]));
    }

    #[test]
    fn summary_records_updated() {
        let store = seeded_store();
        migrate_at(&store, &baselines(), fixed_time()).unwrap();

        for summary in store.list().unwrap() {
            assert!(summary.is_patch_form());
            assert_eq!(summary.downloads, Some(4));
            let on_store = serde_json::to_vec_pretty(&store.document(&summary.id).unwrap().unwrap())
                .unwrap();
            assert_eq!(summary.size, Some(on_store.len() as u64));
        }
    }

    #[test]
    fn runs_once() {
        let store = seeded_store();
        let first = migrate_at(&store, &baselines(), fixed_time()).unwrap();
        assert!(!first.already_done);
        assert!(store.has_marker(MIGRATION_MARKER).unwrap());

        store
            .insert(record("late01"), json!({"meta": {}, "data": {"cards": {"Cards": []}}}))
            .unwrap();
        let second = migrate_at(&store, &baselines(), fixed_time()).unwrap();
        assert_eq!(
            second,
            MigrationReport { already_done: true, ..Default::default() }
        );
        assert!(!store.read("late01").unwrap().is_patch());
    }

    #[test]
    fn failures_do_not_abort_the_batch() {
        let store = seeded_store();
        store.insert(record("nodata"), json!({"meta": {}, "data": {"weapons": []}})).unwrap();
        store.insert(record("badshape"), json!({"meta": {}, "data": {"cards": [1, 2]}})).unwrap();
        store.insert(record("nobase"), json!({"meta": {}, "data": {"pendants": {"Pendant": []}}})).unwrap();
        store.insert(record("corrupt"), json!({"meta": {}})).unwrap();

        let report = migrate_at(&store, &baselines(), fixed_time()).unwrap();
        assert_eq!(report.migrated, 2);
        assert_eq!(report.failed, 4);
        assert!(store.has_marker(MIGRATION_MARKER).unwrap());

        let nodata = store.list().unwrap().into_iter().find(|r| r.id == "nodata").unwrap();
        assert_eq!(nodata.size, Some(999));
        assert!(nodata.format.is_none());
        assert!(!store.read("badshape").unwrap().is_patch());
    }

    #[test]
    fn patch_form_packages_are_skipped() {
        let store = InMemorySnapshotStore::new();
        let patch_doc = json!({
            "meta": {"format": "patch"},
            "patch": {"meta": {"schema": 1, "kind": "card", "baseSha256": "00"}, "changes": {}},
        });
        store.insert(record("already"), patch_doc.clone()).unwrap();
        let mut flagged = record("flagged");
        flagged.format = Some(PATCH_FORMAT.into());
        store.insert(flagged, json!({"meta": {}})).unwrap();

        let report = migrate_at(&store, &baselines(), fixed_time()).unwrap();
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(store.document("already").unwrap().unwrap(), patch_doc);
    }

    #[test]
    fn migrated_patch_reapplies_to_legacy_data() {
        let store = seeded_store();
        let baselines = baselines();
        migrate_at(&store, &baselines, fixed_time()).unwrap();

        let StoredSnapshot::Patch(package) = store.read("multi1").unwrap() else {
            panic!("expected patch form");
        };
        let cards = package.body.envelopes()[0].clone();
        let patch = serde_json::to_value(&cards).unwrap();
        let outcome = cfgpatch_merge::apply_patch(
            &patch,
            baselines.baseline(Kind::Card).unwrap(),
            Kind::Card,
        )
        .unwrap();
        assert!(outcome.is_clean());
        assert_eq!(
            outcome.result,
            json!({"Name": "deck", "Cards": [{"ID": "a", "hp": 1}, {"ID": "b", "hp": 2}]})
        );
    }

    #[test]
    fn file_store_end_to_end() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("index.json"),
            serde_json::to_vec(&json!({"items": [
                {"id": "share01", "title": "t", "size": 1, "tokenHash": "abc", "custom": true},
            ]}))
            .unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("share01.json"),
            serde_json::to_vec(&json!({
                "meta": {"title": "t"},
                "data": {"mapEvents": [{"ID": "e1", "w": 9}, {"ID": "e2", "w": 2}]},
            }))
            .unwrap(),
        )
        .unwrap();

        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let report = migrate(&store, &baselines()).unwrap();
        assert_eq!(report.migrated, 1);
        assert!(dir.path().join(".patch-migration-v1.done").is_file());

        let index: Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("index.json")).unwrap()).unwrap();
        let item = &index["items"][0];
        let size = std::fs::metadata(dir.path().join("share01.json")).unwrap().len();
        assert_eq!(item["size"], json!(size));
        assert_eq!(item["format"], json!("patch"));
        assert_eq!(item["tokenHash"], json!("abc"));
        assert_eq!(item["custom"], json!(true));
    }

    #[test]
    fn file_store_keeps_entries_it_cannot_read() {
        let dir = TempDir::new().unwrap();
        let orphan = json!({"title": "no id", "size": "n/a"});
        std::fs::write(
            dir.path().join("index.json"),
            serde_json::to_vec(&json!({"items": [
                {"id": "share01", "title": "t", "size": 1},
                {"id": "share02", "baseDataVersion": null, "downloads": "12", "size": 5},
                orphan.clone(),
            ]}))
            .unwrap(),
        )
        .unwrap();
        for id in ["share01", "share02"] {
            std::fs::write(
                dir.path().join(format!("{id}.json")),
                serde_json::to_vec(&json!({"meta": {}, "data": {"mapEvents": [{"ID": "e1", "w": 3}]}}))
                    .unwrap(),
            )
            .unwrap();
        }

        let store = FileSnapshotStore::open(dir.path()).unwrap();
        let report = migrate(&store, &baselines()).unwrap();
        assert_eq!(report.migrated, 2);
        assert_eq!(report.failed, 0);

        let index: Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("index.json")).unwrap()).unwrap();
        let items = index["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);

        let size = std::fs::metadata(dir.path().join("share02.json")).unwrap().len();
        assert_eq!(
            items[1],
            json!({
                "id": "share02",
                "baseDataVersion": null,
                "downloads": "12",
                "size": size,
                "format": "patch",
            })
        );
        assert_eq!(items[2], orphan);
    }
}
