//! Catalog-side entities
//!
//! [`CatalogRecord`] is a document stored by the remote catalog service;
//! [`CatalogSummary`] identifies a catalog (collection) within a namespace.
//! Both are owned by the remote service; kbsync only reads them and asks the
//! service to create or delete them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metadata::ExternalMetadata;
use super::newtypes::RecordUid;

/// A collection of records within a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    /// Service-side identifier
    pub id: String,
    /// Display name; doubles as the logical catalog id
    pub display_name: String,
}

/// A record stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Catalog-assigned identifier
    pub uid: RecordUid,
    /// Display name (the external file name for records kbsync created)
    pub display_name: String,
    /// File type as reported by the catalog (e.g. `FILE_TYPE_PDF`)
    pub file_type: String,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
    /// Size in bytes as reported by the catalog
    pub size: i64,
    /// Bag written at upload time; `None` for records created elsewhere
    pub external_metadata: Option<ExternalMetadata>,
}

impl CatalogRecord {
    /// External ID echoed in the metadata, if any
    pub fn external_id(&self) -> Option<&str> {
        self.external_metadata
            .as_ref()
            .and_then(ExternalMetadata::external_id)
    }

    /// View link echoed in the metadata, if any
    pub fn view_link(&self) -> Option<&str> {
        self.external_metadata
            .as_ref()
            .and_then(ExternalMetadata::view_link)
    }

    /// Echoed modification time; the zero time when missing or unparsable
    pub fn modified_at(&self) -> DateTime<Utc> {
        self.external_metadata
            .as_ref()
            .map(ExternalMetadata::modified_at)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExternalFile;

    fn record(meta: Option<ExternalMetadata>) -> CatalogRecord {
        CatalogRecord {
            uid: RecordUid::new("uid-1".to_string()).unwrap(),
            display_name: "a.pdf".to_string(),
            file_type: "FILE_TYPE_PDF".to_string(),
            create_time: None,
            update_time: None,
            size: 10,
            external_metadata: meta,
        }
    }

    #[test]
    fn test_record_without_metadata() {
        let rec = record(None);
        assert_eq!(rec.external_id(), None);
        assert_eq!(rec.view_link(), None);
        assert_eq!(rec.modified_at(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_record_reads_echoed_fields() {
        let file = ExternalFile {
            id: "f1".to_string(),
            modified_time: "2021-08-02T00:00:00Z".to_string(),
            web_view_link: "https://drive.google.com/file/d/1/view".to_string(),
            ..Default::default()
        };
        let rec = record(Some(ExternalMetadata::from_file(&file)));
        assert_eq!(rec.external_id(), Some("f1"));
        assert_eq!(
            rec.view_link(),
            Some("https://drive.google.com/file/d/1/view")
        );
        assert_eq!(
            rec.modified_at(),
            "2021-08-02T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }
}
