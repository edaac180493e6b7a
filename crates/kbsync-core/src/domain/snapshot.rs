//! Catalog snapshot index
//!
//! The [`SnapshotIndex`] holds the catalog records that belong to the
//! manifest's source, keyed by the external ID echoed in their metadata.
//! Anything else listed from the catalog is excluded silently: excluded
//! records are never compared and never deleted.
//!
//! Later copies of an already indexed external ID are the one exception.
//! They stay out of the index but are kept aside so the differ can delete
//! them on the same grounds as any other record of the source.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use super::catalog_record::CatalogRecord;
use super::newtypes::ExternalId;
use super::source::SourceClassifier;

/// Why a listed record was left out of the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    /// The record carries no external metadata at all
    NoMetadata,
    /// Metadata has no usable `id`
    MissingExternalId,
    /// View link is absent, unclassified, or classifies to another source
    ForeignSource,
    /// Another record with the same external ID was indexed first
    DuplicateExternalId,
    /// The listing entry could not be parsed into a record
    Malformed,
}

impl Display for ExclusionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoMetadata => "no_metadata",
            Self::MissingExternalId => "missing_external_id",
            Self::ForeignSource => "foreign_source",
            Self::DuplicateExternalId => "duplicate_external_id",
            Self::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

/// Catalog records of one source keyed by external ID
#[derive(Debug, Clone, Default)]
pub struct SnapshotIndex {
    records: HashMap<ExternalId, CatalogRecord>,
    duplicates: Vec<(ExternalId, CatalogRecord)>,
    excluded: HashMap<ExclusionReason, usize>,
}

impl SnapshotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `record` if it originated from `source`
    ///
    /// # Errors
    /// Returns the [`ExclusionReason`] when the record is left out. The
    /// exclusion is also counted in [`SnapshotIndex::excluded`].
    pub fn admit(
        &mut self,
        record: CatalogRecord,
        classifier: &SourceClassifier,
        source: &str,
    ) -> Result<(), ExclusionReason> {
        let result = Self::key_for(&record, classifier, source).and_then(|key| {
            if self.records.contains_key(&key) {
                self.duplicates.push((key, record));
                Err(ExclusionReason::DuplicateExternalId)
            } else {
                self.records.insert(key, record);
                Ok(())
            }
        });
        if let Err(reason) = result {
            self.exclude(reason, 1);
        }
        result
    }

    /// Counts `count` listed entries as excluded for `reason`
    pub fn exclude(&mut self, reason: ExclusionReason, count: usize) {
        if count > 0 {
            *self.excluded.entry(reason).or_default() += count;
        }
    }

    fn key_for(
        record: &CatalogRecord,
        classifier: &SourceClassifier,
        source: &str,
    ) -> Result<ExternalId, ExclusionReason> {
        let meta = record
            .external_metadata
            .as_ref()
            .ok_or(ExclusionReason::NoMetadata)?;

        let tag = meta.view_link().and_then(|link| classifier.classify(link));
        if tag != Some(source) {
            return Err(ExclusionReason::ForeignSource);
        }

        meta.external_id()
            .and_then(|id| ExternalId::new(id.to_string()).ok())
            .ok_or(ExclusionReason::MissingExternalId)
    }

    pub fn get(&self, id: &ExternalId) -> Option<&CatalogRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &ExternalId) -> bool {
        self.records.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExternalId, &CatalogRecord)> {
        self.records.iter()
    }

    /// Later copies of indexed external IDs, in listing order
    pub fn duplicates(&self) -> impl Iterator<Item = (&ExternalId, &CatalogRecord)> {
        self.duplicates.iter().map(|(id, record)| (id, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records excluded for `reason`
    pub fn excluded(&self, reason: ExclusionReason) -> usize {
        self.excluded.get(&reason).copied().unwrap_or(0)
    }

    /// Total number of excluded records
    pub fn excluded_total(&self) -> usize {
        self.excluded.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExternalFile, ExternalMetadata, RecordUid};
    use serde_json::json;

    const DRIVE: &str = "https://drive.google.com/file/d/x/view";

    fn record(uid: &str, meta: Option<ExternalMetadata>) -> CatalogRecord {
        CatalogRecord {
            uid: RecordUid::new(uid.to_string()).unwrap(),
            display_name: format!("{uid}.pdf"),
            file_type: "FILE_TYPE_PDF".to_string(),
            create_time: None,
            update_time: None,
            size: 0,
            external_metadata: meta,
        }
    }

    fn meta(id: &str, link: &str) -> ExternalMetadata {
        ExternalMetadata::from_file(&ExternalFile {
            id: id.to_string(),
            web_view_link: link.to_string(),
            modified_time: "2021-08-02T00:00:00Z".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_admits_matching_source() {
        let mut index = SnapshotIndex::new();
        let classifier = SourceClassifier::default();
        index
            .admit(record("u1", Some(meta("f1", DRIVE))), &classifier, "googleDrive")
            .unwrap();
        assert_eq!(index.len(), 1);
        let key: ExternalId = "f1".parse().unwrap();
        assert_eq!(index.get(&key).unwrap().uid.as_str(), "u1");
    }

    #[test]
    fn test_excludes_without_metadata() {
        let mut index = SnapshotIndex::new();
        let result = index.admit(record("u1", None), &SourceClassifier::default(), "googleDrive");
        assert_eq!(result, Err(ExclusionReason::NoMetadata));
        assert!(index.is_empty());
        assert_eq!(index.excluded(ExclusionReason::NoMetadata), 1);
    }

    #[test]
    fn test_excludes_foreign_and_unclassified_sources() {
        let mut index = SnapshotIndex::new();
        let classifier = SourceClassifier::default();
        assert_eq!(
            index.admit(
                record("u1", Some(meta("f1", "https://example.com/f1"))),
                &classifier,
                "googleDrive"
            ),
            Err(ExclusionReason::ForeignSource)
        );
        assert_eq!(
            index.admit(record("u2", Some(meta("f2", ""))), &classifier, "googleDrive"),
            Err(ExclusionReason::ForeignSource)
        );
        assert_eq!(index.excluded(ExclusionReason::ForeignSource), 2);
    }

    #[test]
    fn test_excludes_missing_id() {
        let mut index = SnapshotIndex::new();
        let bag = ExternalMetadata::from_map(
            json!({ "web-view-link": DRIVE }).as_object().unwrap().clone(),
        );
        assert_eq!(
            index.admit(record("u1", Some(bag)), &SourceClassifier::default(), "googleDrive"),
            Err(ExclusionReason::MissingExternalId)
        );
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut index = SnapshotIndex::new();
        let classifier = SourceClassifier::default();
        index
            .admit(record("u1", Some(meta("f1", DRIVE))), &classifier, "googleDrive")
            .unwrap();
        assert_eq!(
            index.admit(record("u2", Some(meta("f1", DRIVE))), &classifier, "googleDrive"),
            Err(ExclusionReason::DuplicateExternalId)
        );
        let key: ExternalId = "f1".parse().unwrap();
        assert_eq!(index.get(&key).unwrap().uid.as_str(), "u1");
        assert_eq!(index.excluded_total(), 1);

        let dups: Vec<_> = index.duplicates().map(|(_, r)| r.uid.as_str()).collect();
        assert_eq!(dups, vec!["u2"]);
    }

    #[test]
    fn test_foreign_records_are_not_kept_as_duplicates() {
        let mut index = SnapshotIndex::new();
        let classifier = SourceClassifier::default();
        index
            .admit(record("u1", Some(meta("f1", DRIVE))), &classifier, "googleDrive")
            .unwrap();
        let _ = index.admit(
            record("u2", Some(meta("f1", "https://example.com/f1"))),
            &classifier,
            "googleDrive",
        );
        assert_eq!(index.duplicates().count(), 0);
    }

    #[test]
    fn test_exclude_counts_malformed_entries() {
        let mut index = SnapshotIndex::new();
        index.exclude(ExclusionReason::Malformed, 2);
        index.exclude(ExclusionReason::Malformed, 0);
        assert_eq!(index.excluded(ExclusionReason::Malformed), 2);
        assert_eq!(index.excluded_total(), 2);
    }
}
