//! Content typer port
//!
//! Determines the file type the catalog should record for an upload. The
//! default implementation, [`ExtensionContentTyper`], lives in the domain
//! module; adapters may sniff payload bytes instead.
//!
//! [`ExtensionContentTyper`]: crate::domain::ExtensionContentTyper

use crate::domain::{DomainError, ExternalFile, FileType};

/// Port trait for typing upload payloads
pub trait IContentTyper: Send + Sync {
    /// Returns the file type of `file`'s payload
    ///
    /// # Errors
    /// Returns [`DomainError::UntypableContent`] when no type can be determined
    fn file_type(&self, file: &ExternalFile) -> Result<FileType, DomainError>;
}
