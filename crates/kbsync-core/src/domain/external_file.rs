//! External file (manifest entry)
//!
//! An [`ExternalFile`] is one unit of truth supplied by the caller: a file
//! reported by the external content source, immutable for the duration of a
//! run. Field names on the wire match the external metadata keys so that a
//! manifest entry and the metadata echoed by the catalog read the same.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// A file reported by the external content source
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExternalFile {
    /// Stable external identity (the join key)
    pub id: String,
    /// File name, including extension
    pub name: String,
    /// Base64 payload, optionally as a `data:<mime>;base64,` URI
    pub content: String,
    /// Creation time at the source (RFC 3339)
    pub created_time: String,
    /// Last modification time at the source (RFC 3339)
    pub modified_time: String,
    /// Size in bytes as reported by the source
    pub size: i64,
    /// MIME type as reported by the source
    pub mime_type: String,
    /// MD5 checksum as reported by the source
    pub md5_checksum: String,
    /// Source-side version counter
    pub version: i64,
    /// Link used to view the file; classifies the source
    pub web_view_link: String,
    /// Direct download link
    pub web_content_link: String,
}

impl ExternalFile {
    /// Parses `modified-time` as an RFC 3339 timestamp
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidTimestamp`] if the value does not parse
    pub fn modified_at(&self) -> Result<DateTime<Utc>, DomainError> {
        DateTime::parse_from_rfc3339(&self.modified_time)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| DomainError::InvalidTimestamp {
                field: "modified-time".to_string(),
                value: self.modified_time.clone(),
            })
    }

    /// Returns the raw base64 payload, stripping a data-URI prefix if present
    pub fn content_base64(&self) -> &str {
        match split_data_uri(&self.content) {
            Some((_, payload)) => payload,
            None => &self.content,
        }
    }

    /// Returns the MIME type declared by a data-URI prefix, if any
    pub fn content_mime(&self) -> Option<&str> {
        split_data_uri(&self.content).map(|(mime, _)| mime)
    }
}

/// Splits `data:<mime>;<encoding>,<payload>` into `(mime, payload)`
fn split_data_uri(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("data:")?;
    let (mime, after) = rest.split_once(';')?;
    let (_, payload) = after.split_once(',')?;
    Some((mime, payload))
}
