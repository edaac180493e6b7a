//! Sync engine
//!
//! Orchestrates one reconciliation run:
//!
//! ```text
//! manifest ──► provision catalog ──► load snapshot ──► diff ──► execute ──► outcome
//! ```
//!
//! Every collaborator is injected at construction time; the engine holds no
//! state between runs and re-derives everything from the request and a
//! fresh catalog listing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use kbsync_core::config::Config;
use kbsync_core::domain::{Manifest, SnapshotIndex, SourceClassifier};
use kbsync_core::ports::{ICatalogService, IContentTyper, NewCatalog};
use kbsync_core::usecases::{LoadSnapshotUseCase, ProvisionCatalogUseCase};

use crate::differ::{diff, SyncPlan};
use crate::executor::{PlanExecutor, SyncOutcome};
use crate::task::SyncRequest;
use crate::SyncError;

// ============================================================================
// SyncEngine
// ============================================================================

/// Reconciles a catalog with a caller-supplied manifest
pub struct SyncEngine {
    catalog: Arc<dyn ICatalogService + Send + Sync>,
    classifier: SourceClassifier,
    executor: PlanExecutor,
    run_timeout: Duration,
}

impl SyncEngine {
    /// Creates a new SyncEngine
    ///
    /// # Arguments
    ///
    /// * `catalog` - Remote catalog service
    /// * `typer` - Decides the declared file type of each upload
    /// * `classifier` - Maps view links to source tags
    /// * `config` - Supplies the `sync` section (timeout, concurrency, processing trigger)
    pub fn new(
        catalog: Arc<dyn ICatalogService + Send + Sync>,
        typer: Arc<dyn IContentTyper>,
        classifier: SourceClassifier,
        config: &Config,
    ) -> Self {
        let executor = PlanExecutor::new(
            Arc::clone(&catalog),
            typer,
            config.sync.create_concurrency,
            config.sync.trigger_processing,
        );
        Self {
            catalog,
            classifier,
            executor,
            run_timeout: Duration::from_secs(config.sync.run_timeout_secs),
        }
    }

    /// Runs a full sync, bounded by the configured run timeout
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] for an invalid manifest, a provisioning,
    /// listing, or delete failure, or when the time budget runs out. Failed
    /// creates are not errors; they are listed in the outcome.
    #[instrument(skip(self, request), fields(namespace = %request.namespace, catalog = %request.catalog_id))]
    pub async fn sync(&self, request: &SyncRequest) -> Result<SyncOutcome, SyncError> {
        tokio::time::timeout(self.run_timeout, self.run(request))
            .await
            .map_err(|_| SyncError::Timeout(self.run_timeout))?
    }

    /// Computes what [`sync`](Self::sync) would do without changing anything
    ///
    /// A missing catalog is not created; every manifest file is then
    /// planned as an upload.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] for an invalid manifest, a lookup or listing
    /// failure, or when the time budget runs out.
    #[instrument(skip(self, request), fields(namespace = %request.namespace, catalog = %request.catalog_id))]
    pub async fn plan(&self, request: &SyncRequest) -> Result<SyncPlan, SyncError> {
        tokio::time::timeout(self.run_timeout, self.dry_run(request))
            .await
            .map_err(|_| SyncError::Timeout(self.run_timeout))?
    }

    async fn run(&self, request: &SyncRequest) -> Result<SyncOutcome, SyncError> {
        let start = Instant::now();
        let namespace = request.namespace.as_str();

        let manifest = Manifest::new(request.third_party_files.clone(), &self.classifier)?;

        let provisioned = ProvisionCatalogUseCase::new(Arc::clone(&self.catalog))
            .execute(
                namespace,
                &NewCatalog {
                    display_name: request.catalog_id.clone(),
                    description: request.description.clone(),
                    tags: request.tags.clone(),
                },
            )
            .await
            .map_err(SyncError::Provision)?;
        let catalog_id = provisioned.catalog.id.as_str();

        let Some(source) = manifest.source() else {
            info!("Manifest is empty, nothing to reconcile");
            let mut outcome = SyncOutcome::empty(catalog_id);
            outcome.duration_ms = elapsed_ms(start);
            return Ok(outcome);
        };

        let snapshot = LoadSnapshotUseCase::new(Arc::clone(&self.catalog))
            .execute(namespace, catalog_id, &self.classifier, source)
            .await
            .map_err(SyncError::Listing)?;

        let plan = diff(&snapshot, &manifest);
        info!(
            source,
            manifest = manifest.len(),
            indexed = snapshot.len(),
            excluded = snapshot.excluded_total(),
            to_delete = plan.to_delete.len(),
            to_replace = plan.to_replace.len(),
            to_upload = plan.to_upload.len(),
            "Computed sync plan"
        );

        let mut outcome = self.executor.execute(namespace, catalog_id, plan).await?;
        outcome.duration_ms = elapsed_ms(start);

        info!(
            uploaded = outcome.uploaded_records.len(),
            updated = outcome.updated_records.len(),
            deleted = outcome.deleted,
            failed = outcome.failures.len(),
            duration_ms = outcome.duration_ms,
            "Sync completed"
        );

        Ok(outcome)
    }

    async fn dry_run(&self, request: &SyncRequest) -> Result<SyncPlan, SyncError> {
        let namespace = request.namespace.as_str();
        let manifest = Manifest::new(request.third_party_files.clone(), &self.classifier)?;

        let Some(source) = manifest.source() else {
            return Ok(SyncPlan::default());
        };

        let existing = ProvisionCatalogUseCase::new(Arc::clone(&self.catalog))
            .find(namespace, &request.catalog_id)
            .await
            .map_err(SyncError::Provision)?;

        let snapshot = match existing {
            Some(catalog) => LoadSnapshotUseCase::new(Arc::clone(&self.catalog))
                .execute(namespace, &catalog.id, &self.classifier, source)
                .await
                .map_err(SyncError::Listing)?,
            None => {
                info!("Catalog does not exist yet, every file would be uploaded");
                SnapshotIndex::new()
            }
        };

        Ok(diff(&snapshot, &manifest))
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
