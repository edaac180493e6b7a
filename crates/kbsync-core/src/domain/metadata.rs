//! External metadata codec
//!
//! The catalog stores an opaque, string-keyed bag alongside every record.
//! kbsync writes the originating [`ExternalFile`] into that bag on upload and
//! reads it back on the next run. Three keys drive reconciliation:
//!
//! - `id` - the join key between manifest and catalog
//! - `web-view-link` - classifies which source the record came from
//! - `modified-time` - freshness comparison
//!
//! The remaining keys are echoed for completeness and never interpreted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::external_file::ExternalFile;

pub const ID_KEY: &str = "id";
pub const VIEW_LINK_KEY: &str = "web-view-link";
pub const MODIFIED_TIME_KEY: &str = "modified-time";
pub const NAME_KEY: &str = "name";
pub const CREATED_TIME_KEY: &str = "created-time";
pub const SIZE_KEY: &str = "size";
pub const MIME_TYPE_KEY: &str = "mime-type";
pub const MD5_KEY: &str = "md5-checksum";
pub const VERSION_KEY: &str = "version";
pub const CONTENT_LINK_KEY: &str = "web-content-link";

/// Opaque key-value bag attached to a catalog record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalMetadata(Map<String, Value>);

impl ExternalMetadata {
    /// Wraps an existing JSON object
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Encodes every field of `file` except its content
    pub fn from_file(file: &ExternalFile) -> Self {
        let mut map = Map::new();
        map.insert(ID_KEY.into(), Value::String(file.id.clone()));
        map.insert(VIEW_LINK_KEY.into(), Value::String(file.web_view_link.clone()));
        map.insert(
            MODIFIED_TIME_KEY.into(),
            Value::String(file.modified_time.clone()),
        );
        map.insert(NAME_KEY.into(), Value::String(file.name.clone()));
        map.insert(
            CREATED_TIME_KEY.into(),
            Value::String(file.created_time.clone()),
        );
        map.insert(SIZE_KEY.into(), Value::from(file.size));
        map.insert(MIME_TYPE_KEY.into(), Value::String(file.mime_type.clone()));
        map.insert(MD5_KEY.into(), Value::String(file.md5_checksum.clone()));
        map.insert(VERSION_KEY.into(), Value::from(file.version));
        map.insert(
            CONTENT_LINK_KEY.into(),
            Value::String(file.web_content_link.clone()),
        );
        Self(map)
    }

    /// The underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Reads a non-empty string value. Empty strings count as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Reads an integer value, accepting JSON numbers (including whole
    /// floats) and numeric strings
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn external_id(&self) -> Option<&str> {
        self.get_str(ID_KEY)
    }

    pub fn view_link(&self) -> Option<&str> {
        self.get_str(VIEW_LINK_KEY)
    }

    /// Raw echoed modification time
    pub fn modified_time(&self) -> Option<&str> {
        self.get_str(MODIFIED_TIME_KEY)
    }

    /// Echoed modification time, or the zero time when absent or unparsable
    ///
    /// The zero time is older than any real timestamp, so a record with a
    /// damaged timestamp is always replaced by its manifest counterpart.
    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_time()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Rebuilds the echoed external file. Content is never stored, so the
    /// returned file has an empty payload.
    pub fn to_external_file(&self) -> ExternalFile {
        let text = |key: &str| self.get_str(key).unwrap_or_default().to_string();
        ExternalFile {
            id: text(ID_KEY),
            name: text(NAME_KEY),
            content: String::new(),
            created_time: text(CREATED_TIME_KEY),
            modified_time: text(MODIFIED_TIME_KEY),
            size: self.get_i64(SIZE_KEY).unwrap_or_default(),
            mime_type: text(MIME_TYPE_KEY),
            md5_checksum: text(MD5_KEY),
            version: self.get_i64(VERSION_KEY).unwrap_or_default(),
            web_view_link: text(VIEW_LINK_KEY),
            web_content_link: text(CONTENT_LINK_KEY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file() -> ExternalFile {
        ExternalFile {
            id: "f2".to_string(),
            name: "file-name456.pdf".to_string(),
            content: "xGVzdDEyMw==".to_string(),
            created_time: "2021-08-02T00:00:00Z".to_string(),
            modified_time: "2021-08-03T00:00:00Z".to_string(),
            size: 123,
            mime_type: "text/plain".to_string(),
            md5_checksum: "30bd471c9356ac2397fe96491e83f471".to_string(),
            version: 2,
            web_view_link: "https://drive.google.com/file/d/fakeuuid2/view".to_string(),
            web_content_link: "https://drive.google.com/uc?id=fakeuuid2".to_string(),
        }
    }

    #[test]
    fn test_from_file_writes_all_keys() {
        let meta = ExternalMetadata::from_file(&file());
        let map = meta.as_map();
        for key in [
            ID_KEY,
            VIEW_LINK_KEY,
            MODIFIED_TIME_KEY,
            NAME_KEY,
            CREATED_TIME_KEY,
            SIZE_KEY,
            MIME_TYPE_KEY,
            MD5_KEY,
            VERSION_KEY,
            CONTENT_LINK_KEY,
        ] {
            assert!(map.contains_key(key), "missing key {key}");
        }
        assert_eq!(map.len(), 10);
        assert_eq!(map[SIZE_KEY], json!(123));
        assert_eq!(map[VERSION_KEY], json!(2));
    }

    #[test]
    fn test_echo_restores_file_without_content() {
        let original = file();
        let echoed = ExternalMetadata::from_file(&original).to_external_file();
        assert_eq!(
            echoed,
            ExternalFile {
                content: String::new(),
                ..original
            }
        );
    }

    #[test]
    fn test_numbers_stored_as_floats_are_read_back() {
        // Catalog services backed by protobuf Struct return numbers as doubles
        let meta = ExternalMetadata::from_map(
            json!({ "size": 123.0, "version": "7" })
                .as_object()
                .unwrap()
                .clone(),
        );
        assert_eq!(meta.get_i64(SIZE_KEY), Some(123));
        assert_eq!(meta.get_i64(VERSION_KEY), Some(7));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let meta = ExternalMetadata::from_map(
            json!({ "id": "", "web-view-link": "" })
                .as_object()
                .unwrap()
                .clone(),
        );
        assert_eq!(meta.external_id(), None);
        assert_eq!(meta.view_link(), None);
    }

    #[test]
    fn test_non_string_id_is_absent() {
        let meta =
            ExternalMetadata::from_map(json!({ "id": 42 }).as_object().unwrap().clone());
        assert_eq!(meta.external_id(), None);
    }

    #[test]
    fn test_modified_at_parsed() {
        let meta = ExternalMetadata::from_file(&file());
        assert_eq!(
            meta.modified_at(),
            "2021-08-03T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_modified_at_unparsable_is_zero_time() {
        let meta = ExternalMetadata::from_map(
            json!({ "modified-time": "not-a-time" })
                .as_object()
                .unwrap()
                .clone(),
        );
        assert_eq!(meta.modified_at(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_modified_at_missing_is_zero_time() {
        let meta = ExternalMetadata::default();
        assert_eq!(meta.modified_at(), DateTime::<Utc>::MIN_UTC);
    }
}
