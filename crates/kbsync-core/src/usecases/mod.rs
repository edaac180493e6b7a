//! Use cases (interactors) for kbsync
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate business rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`ProvisionCatalogUseCase`] - Idempotent get-or-create of the target catalog
//! - [`LoadSnapshotUseCase`] - Paged listing of the catalog into a [`SnapshotIndex`]
//!
//! [`SnapshotIndex`]: crate::domain::SnapshotIndex

pub mod load_snapshot;
pub mod provision_catalog;

pub use load_snapshot::LoadSnapshotUseCase;
pub use provision_catalog::{ProvisionCatalogUseCase, ProvisionOutcome};
