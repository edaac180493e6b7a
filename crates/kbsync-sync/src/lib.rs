//! kbsync Sync - Catalog reconciliation engine
//!
//! Provides:
//! - Keyed diff of a catalog snapshot against a caller manifest
//! - Two-phase execution (fatal deletes, isolated concurrent creates)
//! - A time-bounded [`SyncEngine`](engine::SyncEngine) tying the phases together
//!
//! ## Modules
//!
//! - [`differ`] - Computes delete / replace / upload sets
//! - [`executor`] - Applies a [`SyncPlan`](differ::SyncPlan) to the catalog
//! - [`engine`] - Orchestrates provisioning, listing, diffing and execution
//! - [`task`] - JSON task contract (request and response)

pub mod differ;
pub mod engine;
pub mod executor;
pub mod task;

use std::time::Duration;

use kbsync_core::domain::{DomainError, RecordUid};
use thiserror::Error;

/// Errors that abort a sync run
///
/// Per-file create failures are not errors at this level; they are reported
/// in [`SyncOutcome::failures`](executor::SyncOutcome::failures).
#[derive(Debug, Error)]
pub enum SyncError {
    /// The manifest failed validation before any network call
    #[error("Invalid manifest: {0}")]
    InvalidManifest(#[from] DomainError),

    /// The target catalog could not be found or created
    #[error("Catalog provisioning failed: {0:#}")]
    Provision(anyhow::Error),

    /// The catalog's records could not be listed
    #[error("Catalog listing failed: {0:#}")]
    Listing(anyhow::Error),

    /// A record could not be deleted; the run stops before any create
    #[error("Failed to delete record {uid}: {error:#}")]
    Delete { uid: RecordUid, error: anyhow::Error },

    /// The run exceeded its time budget
    #[error("Sync timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}
