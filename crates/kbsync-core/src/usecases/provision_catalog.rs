//! Catalog provisioning use case
//!
//! Ensures the target catalog exists before reconciliation starts. The
//! catalog's display name doubles as its logical ID, so provisioning is a
//! lookup by name followed by a create when nothing matches.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::domain::CatalogSummary;
use crate::ports::{ICatalogService, NewCatalog};

/// Result of provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub catalog: CatalogSummary,
    /// Whether the catalog was created by this call
    pub created: bool,
}

/// Use case for get-or-create of a catalog
pub struct ProvisionCatalogUseCase {
    catalog_service: Arc<dyn ICatalogService + Send + Sync>,
}

impl ProvisionCatalogUseCase {
    /// Creates a new ProvisionCatalogUseCase
    ///
    /// # Arguments
    ///
    /// * `catalog_service` - Remote catalog service
    pub fn new(catalog_service: Arc<dyn ICatalogService + Send + Sync>) -> Self {
        Self { catalog_service }
    }

    /// Looks up a catalog by display name without creating it
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog listing fails
    pub async fn find(&self, namespace: &str, display_name: &str) -> Result<Option<CatalogSummary>> {
        let catalogs = self
            .catalog_service
            .list_catalogs(namespace)
            .await
            .context("Failed to list catalogs")?;

        debug!(namespace, count = catalogs.len(), "Listed catalogs");

        Ok(catalogs
            .into_iter()
            .find(|catalog| catalog.display_name == display_name))
    }

    /// Ensures the catalog described by `request` exists
    ///
    /// This method:
    /// 1. Lists the namespace's catalogs
    /// 2. Returns the one whose display name matches, if any
    /// 3. Otherwise creates it with the optional description and tags
    ///
    /// Calling it twice with the same name creates at most one catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if listing or creation fails
    pub async fn execute(&self, namespace: &str, request: &NewCatalog) -> Result<ProvisionOutcome> {
        if let Some(catalog) = self.find(namespace, &request.display_name).await? {
            debug!(namespace, catalog = %catalog.display_name, "Catalog already exists");
            return Ok(ProvisionOutcome {
                catalog,
                created: false,
            });
        }

        let catalog = self
            .catalog_service
            .create_catalog(namespace, request)
            .await
            .with_context(|| format!("Failed to create catalog '{}'", request.display_name))?;

        info!(namespace, catalog = %catalog.display_name, "Created catalog");

        Ok(ProvisionOutcome {
            catalog,
            created: true,
        })
    }
}
