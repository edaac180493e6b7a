//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including manifest validation failures and payload typing errors.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// External identifier is empty or malformed
    #[error("Invalid external ID: {0}")]
    InvalidExternalId(String),

    /// Catalog record UID is empty or malformed
    #[error("Invalid record UID: {0}")]
    InvalidRecordUid(String),

    /// A timestamp could not be parsed as RFC 3339
    #[error("Invalid timestamp for {field}: {value}")]
    InvalidTimestamp {
        /// Name of the field holding the timestamp
        field: String,
        /// The raw value that failed to parse
        value: String,
    },

    /// The same external ID appears more than once in the manifest
    #[error("Duplicate external ID in manifest: {0}")]
    DuplicateExternalId(String),

    /// A view link does not belong to any known source
    #[error("Unclassified source for view link: {0}")]
    UnclassifiedSource(String),

    /// Manifest entries belong to different sources
    #[error("Mixed sources in manifest: expected {expected}, found {found}")]
    MixedSources {
        /// Source of the first manifest entry
        expected: String,
        /// Conflicting source found later
        found: String,
    },

    /// The payload type could not be determined from name or content
    #[error("Cannot determine payload type: {0}")]
    UntypableContent(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
