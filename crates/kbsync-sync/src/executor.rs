//! Plan executor
//!
//! Applies a [`SyncPlan`] in two strict phases:
//!
//! 1. **Delete** every record in `to_delete` and `to_replace`, one at a time.
//!    The first failure aborts the run with [`SyncError::Delete`].
//! 2. **Create** every file in `to_upload` and `to_replace`, up to
//!    `create_concurrency` at a time. A failing create is recorded in
//!    [`SyncOutcome::failures`] and the others carry on.
//!
//! Replacement is delete-then-create; the catalog has no update in place.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use kbsync_core::domain::{CatalogRecord, ExternalFile, ExternalMetadata, RecordUid};
use kbsync_core::ports::{ICatalogService, IContentTyper, NewRecord};

use crate::differ::SyncPlan;
use crate::SyncError;

// ============================================================================
// Outcome types
// ============================================================================

/// A manifest file whose create failed, and why
#[derive(Debug, Clone, PartialEq)]
pub struct FailureEntry {
    pub file: ExternalFile,
    pub message: String,
}

/// Result of a completed sync run
///
/// `succeeded` means both phases ran to completion. It does not mean every
/// file was created; check [`failures`](Self::failures) for that.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOutcome {
    /// Catalog the run reconciled
    pub catalog_id: String,
    /// Records created for files that were new to the catalog
    pub uploaded_records: Vec<CatalogRecord>,
    /// Records created to replace stale ones
    pub updated_records: Vec<CatalogRecord>,
    /// Files whose create failed, sorted by external ID
    pub failures: Vec<FailureEntry>,
    /// Number of records deleted (including replaced ones)
    pub deleted: usize,
    pub succeeded: bool,
    /// Whether the catalog accepted the request to process new records
    pub processing_triggered: bool,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl SyncOutcome {
    /// Outcome of a run with nothing to do
    pub fn empty(catalog_id: &str) -> Self {
        Self {
            catalog_id: catalog_id.to_string(),
            succeeded: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateKind {
    Upload,
    Replace,
}

// ============================================================================
// PlanExecutor
// ============================================================================

/// Applies a [`SyncPlan`] against the catalog service
pub struct PlanExecutor {
    catalog: Arc<dyn ICatalogService + Send + Sync>,
    typer: Arc<dyn IContentTyper>,
    create_concurrency: usize,
    trigger_processing: bool,
}

impl PlanExecutor {
    /// Creates a new executor
    ///
    /// # Arguments
    ///
    /// * `catalog` - Remote catalog service
    /// * `typer` - Decides the declared file type of each upload
    /// * `create_concurrency` - Maximum creates in flight (clamped to at least 1)
    /// * `trigger_processing` - Ask the catalog to process new records afterwards
    pub fn new(
        catalog: Arc<dyn ICatalogService + Send + Sync>,
        typer: Arc<dyn IContentTyper>,
        create_concurrency: usize,
        trigger_processing: bool,
    ) -> Self {
        Self {
            catalog,
            typer,
            create_concurrency: create_concurrency.max(1),
            trigger_processing,
        }
    }

    /// Runs both phases of `plan` against `catalog_id`
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Delete`] on the first failed delete. No create
    /// is attempted in that case.
    pub async fn execute(
        &self,
        namespace: &str,
        catalog_id: &str,
        plan: SyncPlan,
    ) -> Result<SyncOutcome, SyncError> {
        let SyncPlan {
            to_delete,
            to_replace,
            to_upload,
        } = plan;

        // Phase 1: deletes, sequential and fatal
        let doomed = to_delete
            .iter()
            .chain(to_replace.iter().map(|r| &r.record));
        let mut deleted = 0usize;
        for record in doomed {
            debug!(uid = %record.uid, external_id = ?record.external_id(), "Deleting record");
            self.catalog
                .delete_record(namespace, &record.uid)
                .await
                .map_err(|error| SyncError::Delete {
                    uid: record.uid.clone(),
                    error,
                })?;
            deleted += 1;
        }
        info!(deleted, "Delete phase complete");

        // Phase 2: creates, concurrent and isolated
        let jobs = to_upload
            .into_iter()
            .map(|file| (CreateKind::Upload, file))
            .chain(
                to_replace
                    .into_iter()
                    .map(|replacement| (CreateKind::Replace, replacement.file)),
            );

        let results: Vec<(CreateKind, ExternalFile, Result<CatalogRecord, String>)> =
            stream::iter(jobs)
                .map(|(kind, file)| async move {
                    let result = self.create_one(namespace, catalog_id, &file).await;
                    (kind, file, result)
                })
                .buffer_unordered(self.create_concurrency)
                .collect()
                .await;

        let mut outcome = SyncOutcome {
            catalog_id: catalog_id.to_string(),
            deleted,
            succeeded: true,
            ..SyncOutcome::default()
        };
        for (kind, file, result) in results {
            match (kind, result) {
                (CreateKind::Upload, Ok(record)) => outcome.uploaded_records.push(record),
                (CreateKind::Replace, Ok(record)) => outcome.updated_records.push(record),
                (_, Err(message)) => {
                    warn!(external_id = %file.id, name = %file.name, %message, "Create failed");
                    outcome.failures.push(FailureEntry { file, message });
                }
            }
        }

        outcome
            .uploaded_records
            .sort_by(|a, b| a.external_id().cmp(&b.external_id()));
        outcome
            .updated_records
            .sort_by(|a, b| a.external_id().cmp(&b.external_id()));
        outcome.failures.sort_by(|a, b| a.file.id.cmp(&b.file.id));

        info!(
            uploaded = outcome.uploaded_records.len(),
            updated = outcome.updated_records.len(),
            failed = outcome.failures.len(),
            "Create phase complete"
        );

        outcome.processing_triggered = self.trigger(&outcome).await;

        Ok(outcome)
    }

    /// Builds the upload payload for `file` and creates the record
    async fn create_one(
        &self,
        namespace: &str,
        catalog_id: &str,
        file: &ExternalFile,
    ) -> Result<CatalogRecord, String> {
        let file_type = self
            .typer
            .file_type(file)
            .map_err(|e| format!("build upload payload: {e}"))?;

        let record = NewRecord {
            display_name: file.name.clone(),
            file_type,
            content: file.content_base64().to_string(),
            external_metadata: ExternalMetadata::from_file(file),
        };

        debug!(external_id = %file.id, %file_type, "Creating record");
        self.catalog
            .create_record(namespace, catalog_id, &record)
            .await
            .map_err(|e| format!("create record: {e:#}"))
    }

    /// Asks the catalog to process every record created in this run
    ///
    /// Failure is logged and reported as `false`; it never fails the run.
    async fn trigger(&self, outcome: &SyncOutcome) -> bool {
        if !self.trigger_processing {
            return false;
        }
        let uids: Vec<RecordUid> = outcome
            .uploaded_records
            .iter()
            .chain(outcome.updated_records.iter())
            .map(|record| record.uid.clone())
            .collect();
        if uids.is_empty() {
            return false;
        }

        match self.catalog.process_records(&uids).await {
            Ok(()) => {
                info!(count = uids.len(), "Triggered record processing");
                true
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Failed to trigger record processing");
                false
            }
        }
    }
}
