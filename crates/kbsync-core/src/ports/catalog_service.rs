//! Catalog service port (driven/secondary port)
//!
//! This module defines the interface for the remote catalog (knowledge base)
//! service that stores the records kbsync keeps in sync.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   and don't need domain-level classification.
//! - Uses `#[async_trait]` for async trait methods.
//! - The service has no update-in-place for records: replacing a record means
//!   deleting the old UID and creating a new one.

use crate::domain::{CatalogRecord, CatalogSummary, ExternalMetadata, FileType, RecordUid};

/// Request to create a catalog
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCatalog {
    pub display_name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Request to create a record inside a catalog
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub display_name: String,
    pub file_type: FileType,
    /// Raw base64 payload (no data-URI prefix)
    pub content: String,
    pub external_metadata: ExternalMetadata,
}

/// One page of a record listing
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub records: Vec<CatalogRecord>,
    /// Token for the next page; `None` (or empty) on the last page
    pub next_page_token: Option<String>,
    /// Listing entries the adapter skipped because they did not parse
    pub malformed: usize,
}

impl RecordPage {
    /// Next page token, treating an empty string as "no more pages"
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Port trait for remote catalog operations
///
/// ## Implementation Notes
///
/// - Implementations may retry transient failures (throttling) internally.
/// - All methods assume the adapter is already authenticated.
#[async_trait::async_trait]
pub trait ICatalogService: Send + Sync {
    /// Lists the catalogs of a namespace
    async fn list_catalogs(&self, namespace: &str) -> anyhow::Result<Vec<CatalogSummary>>;

    /// Creates a catalog in a namespace
    async fn create_catalog(
        &self,
        namespace: &str,
        catalog: &NewCatalog,
    ) -> anyhow::Result<CatalogSummary>;

    /// Lists one page of a catalog's records
    ///
    /// # Arguments
    /// * `page_token` - Token from the previous page (`None` for the first page)
    async fn list_records(
        &self,
        namespace: &str,
        catalog_id: &str,
        page_token: Option<&str>,
    ) -> anyhow::Result<RecordPage>;

    /// Creates a record and returns it as stored (with its new UID)
    async fn create_record(
        &self,
        namespace: &str,
        catalog_id: &str,
        record: &NewRecord,
    ) -> anyhow::Result<CatalogRecord>;

    /// Deletes a record by UID
    async fn delete_record(&self, namespace: &str, uid: &RecordUid) -> anyhow::Result<()>;

    /// Asks the service to start processing (ingesting) the given records
    async fn process_records(&self, uids: &[RecordUid]) -> anyhow::Result<()>;
}
