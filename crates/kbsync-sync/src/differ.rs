//! Snapshot/manifest differ
//!
//! Computes the three disjoint sets that converge the catalog toward the
//! manifest. A record is only ever scheduled for deletion because its
//! external ID left the manifest, or because the manifest holds a strictly
//! newer version of it.

use kbsync_core::domain::{CatalogRecord, ExternalFile, Manifest, SnapshotIndex};

/// A stale record and the newer file that supersedes it
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub record: CatalogRecord,
    pub file: ExternalFile,
}

/// Changes needed to converge the catalog toward the manifest
///
/// Each list is sorted by external ID (then UID, for duplicate copies).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    /// Records whose external ID is absent from the manifest, and duplicate
    /// copies the manifest holds a strictly newer version of
    pub to_delete: Vec<CatalogRecord>,
    /// Records the manifest holds a strictly newer version of
    pub to_replace: Vec<Replacement>,
    /// Manifest files with no record in the catalog
    pub to_upload: Vec<ExternalFile>,
}

impl SyncPlan {
    /// True when the catalog already matches the manifest
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_replace.is_empty() && self.to_upload.is_empty()
    }

    /// Number of delete calls the plan requires (deletes plus replacements)
    pub fn delete_count(&self) -> usize {
        self.to_delete.len() + self.to_replace.len()
    }

    /// Number of create calls the plan requires (uploads plus replacements)
    pub fn create_count(&self) -> usize {
        self.to_upload.len() + self.to_replace.len()
    }
}

/// Diffs a catalog snapshot against the manifest
///
/// One pass over the snapshot sorts each record into delete or replace
/// (strictly newer manifest time only), then one pass over the manifest
/// collects the files the snapshot does not know. Duplicate copies are
/// only ever deleted; the indexed copy carries the replacement.
pub fn diff(snapshot: &SnapshotIndex, manifest: &Manifest) -> SyncPlan {
    let mut plan = SyncPlan::default();

    for (id, record) in snapshot.iter() {
        match manifest.get(id) {
            None => plan.to_delete.push(record.clone()),
            Some(entry) if entry.modified_at > record.modified_at() => {
                plan.to_replace.push(Replacement {
                    record: record.clone(),
                    file: entry.file.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for (id, record) in snapshot.duplicates() {
        let stale = match manifest.get(id) {
            None => true,
            Some(entry) => entry.modified_at > record.modified_at(),
        };
        if stale {
            plan.to_delete.push(record.clone());
        }
    }

    for (id, entry) in manifest.iter() {
        if !snapshot.contains(id) {
            plan.to_upload.push(entry.file.clone());
        }
    }

    plan.to_delete.sort_by(|a, b| {
        a.external_id()
            .cmp(&b.external_id())
            .then_with(|| a.uid.as_str().cmp(b.uid.as_str()))
    });
    plan.to_replace.sort_by(|a, b| a.file.id.cmp(&b.file.id));
    plan.to_upload.sort_by(|a, b| a.id.cmp(&b.id));

    plan
}
