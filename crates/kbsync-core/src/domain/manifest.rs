//! Manifest (the current truth)
//!
//! A [`Manifest`] is the validated, keyed form of the caller-supplied file
//! list. Validation happens up front so that a malformed manifest aborts the
//! run before any catalog call is made:
//!
//! - every entry has a non-empty, unique external ID
//! - every `modified-time` parses as RFC 3339
//! - every view link classifies to the same known source

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::errors::DomainError;
use super::external_file::ExternalFile;
use super::newtypes::ExternalId;
use super::source::SourceClassifier;

/// A manifest file together with its parsed modification time
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub file: ExternalFile,
    pub modified_at: DateTime<Utc>,
}

/// Caller-supplied files keyed by external ID
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    source: Option<String>,
    entries: HashMap<ExternalId, ManifestEntry>,
}

impl Manifest {
    /// Validates and indexes `files`
    ///
    /// # Errors
    /// Returns the first [`DomainError`] found; see the module docs for the rules
    pub fn new(files: Vec<ExternalFile>, classifier: &SourceClassifier) -> Result<Self, DomainError> {
        let mut source: Option<String> = None;
        let mut entries = HashMap::with_capacity(files.len());

        for file in files {
            let id = ExternalId::new(file.id.clone())?;

            let tag = classifier
                .classify(&file.web_view_link)
                .ok_or_else(|| DomainError::UnclassifiedSource(file.web_view_link.clone()))?;
            match &source {
                None => source = Some(tag.to_string()),
                Some(expected) if expected != tag => {
                    return Err(DomainError::MixedSources {
                        expected: expected.clone(),
                        found: tag.to_string(),
                    });
                }
                Some(_) => {}
            }

            let modified_at = file.modified_at()?;

            if entries.contains_key(&id) {
                return Err(DomainError::DuplicateExternalId(id.to_string()));
            }
            entries.insert(id, ManifestEntry { file, modified_at });
        }

        Ok(Self { source, entries })
    }

    /// Source tag shared by all entries; `None` for an empty manifest
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn get(&self, id: &ExternalId) -> Option<&ManifestEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &ExternalId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExternalId, &ManifestEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
