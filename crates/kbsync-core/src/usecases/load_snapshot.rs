//! Catalog snapshot use case
//!
//! Pages through every record of a catalog and indexes the ones that came
//! from a given external source, keyed by their echoed external ID.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::domain::{ExclusionReason, SnapshotIndex, SourceClassifier};
use crate::ports::ICatalogService;

/// Use case for building a [`SnapshotIndex`] from the remote catalog
pub struct LoadSnapshotUseCase {
    catalog_service: Arc<dyn ICatalogService + Send + Sync>,
}

impl LoadSnapshotUseCase {
    pub fn new(catalog_service: Arc<dyn ICatalogService + Send + Sync>) -> Self {
        Self { catalog_service }
    }

    /// Lists the whole catalog and indexes records originating from `source`
    ///
    /// Pages are requested until the service returns no (or an empty) next
    /// page token. Records without metadata, from another source, without an
    /// external ID, or repeating an already indexed external ID are skipped
    /// and counted on the index, as are entries the adapter could not parse.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails, or if the service hands
    /// back a page token it already returned (the listing would never end).
    pub async fn execute(
        &self,
        namespace: &str,
        catalog_id: &str,
        classifier: &SourceClassifier,
        source: &str,
    ) -> Result<SnapshotIndex> {
        let mut index = SnapshotIndex::new();
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .catalog_service
                .list_records(namespace, catalog_id, page_token.as_deref())
                .await
                .with_context(|| format!("Failed to list records of catalog '{catalog_id}'"))?;
            pages += 1;

            if page.malformed > 0 {
                warn!(catalog_id, count = page.malformed, "Skipped malformed listing entries");
                index.exclude(ExclusionReason::Malformed, page.malformed);
            }

            for record in page.records.iter().cloned() {
                let uid = record.uid.clone();
                if let Err(reason) = index.admit(record, classifier, source) {
                    match reason {
                        ExclusionReason::DuplicateExternalId => {
                            warn!(%uid, %reason, "Duplicate record kept out of snapshot")
                        }
                        _ => debug!(%uid, %reason, "Record excluded from snapshot"),
                    }
                }
            }

            match page.next_token() {
                Some(token) => {
                    if !seen_tokens.insert(token.to_string()) {
                        bail!("Catalog listing returned page token '{token}' twice");
                    }
                    page_token = Some(token.to_string());
                }
                None => break,
            }
        }

        debug!(
            catalog_id,
            pages,
            indexed = index.len(),
            excluded = index.excluded_total(),
            "Loaded catalog snapshot"
        );

        Ok(index)
    }
}
