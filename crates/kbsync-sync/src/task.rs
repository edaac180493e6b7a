//! Task contract
//!
//! JSON request and response exchanged with whatever dispatches sync runs
//! (the CLI reads a request from a file or stdin). Field names are
//! kebab-case; the older `collection-id` / `external-files` spellings are
//! accepted on input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kbsync_core::domain::{CatalogRecord, ExternalFile, ExternalMetadata};

use crate::executor::SyncOutcome;

/// Input of a sync run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyncRequest {
    pub namespace: String,
    /// Display name of the target catalog; created when missing
    #[serde(alias = "collection-id")]
    pub catalog_id: String,
    /// Current truth from the external source
    #[serde(default, alias = "external-files")]
    pub third_party_files: Vec<ExternalFile>,
    /// Description used if the catalog has to be created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags used if the catalog has to be created
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A catalog record created by a sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecordOutput {
    pub file_uid: String,
    pub file_name: String,
    pub file_type: String,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    pub size: i64,
    pub catalog_id: String,
    /// Metadata echoed back by the catalog, when it returned any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_metadata: Option<ExternalMetadata>,
}

impl RecordOutput {
    pub fn from_record(record: &CatalogRecord, catalog_id: &str) -> Self {
        Self {
            file_uid: record.uid.to_string(),
            file_name: record.display_name.clone(),
            file_type: record.file_type.clone(),
            create_time: record.create_time,
            update_time: record.update_time,
            size: record.size,
            catalog_id: catalog_id.to_string(),
            external_metadata: record.external_metadata.clone(),
        }
    }
}

/// Output of a sync run
///
/// `error-messages` is parallel to `failure-files`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyncResponse {
    pub uploaded_files: Vec<RecordOutput>,
    pub updated_files: Vec<RecordOutput>,
    pub failure_files: Vec<ExternalFile>,
    pub error_messages: Vec<String>,
    pub succeeded: bool,
    #[serde(default)]
    pub processing_triggered: bool,
}

impl From<&SyncOutcome> for SyncResponse {
    fn from(outcome: &SyncOutcome) -> Self {
        let output = |record: &CatalogRecord| RecordOutput::from_record(record, &outcome.catalog_id);
        Self {
            uploaded_files: outcome.uploaded_records.iter().map(output).collect(),
            updated_files: outcome.updated_records.iter().map(output).collect(),
            failure_files: outcome
                .failures
                .iter()
                .map(|failure| failure.file.clone())
                .collect(),
            error_messages: outcome
                .failures
                .iter()
                .map(|failure| failure.message.clone())
                .collect(),
            succeeded: outcome.succeeded,
            processing_triggered: outcome.processing_triggered,
        }
    }
}
