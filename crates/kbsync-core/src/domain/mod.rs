//! Domain entities and business logic
//!
//! This module contains the core domain types for kbsync:
//! - Newtypes for type-safe identifiers
//! - External files (the manifest side) and catalog records (the catalog side)
//! - The external metadata codec that joins the two across runs
//! - Source classification of view links
//! - Payload file typing
//! - Domain-specific error types

pub mod catalog_record;
pub mod content_type;
pub mod errors;
pub mod external_file;
pub mod manifest;
pub mod metadata;
pub mod newtypes;
pub mod snapshot;
pub mod source;

// Re-export commonly used types
pub use catalog_record::{CatalogRecord, CatalogSummary};
pub use content_type::{ExtensionContentTyper, FileType};
pub use errors::DomainError;
pub use external_file::ExternalFile;
pub use manifest::{Manifest, ManifestEntry};
pub use metadata::ExternalMetadata;
pub use newtypes::{ExternalId, RecordUid};
pub use snapshot::{ExclusionReason, SnapshotIndex};
pub use source::{SourceClassifier, SourceRule, GOOGLE_DRIVE};
