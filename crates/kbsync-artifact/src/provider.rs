//! ArtifactCatalogService - ICatalogService implementation for the artifact API
//!
//! Translates the catalog port into artifact REST calls:
//!
//! | Port method        | Endpoint                                                      |
//! |--------------------|---------------------------------------------------------------|
//! | `list_catalogs`    | `GET  /v1alpha/namespaces/{ns}/catalogs`                      |
//! | `create_catalog`   | `POST /v1alpha/namespaces/{ns}/catalogs`                      |
//! | `list_records`     | `GET  /v1alpha/namespaces/{ns}/catalogs/{catalog}/files`      |
//! | `create_record`    | `POST /v1alpha/namespaces/{ns}/catalogs/{catalog}/files`      |
//! | `delete_record`    | `DELETE /v1alpha/namespaces/{ns}/catalogs/files?fileUid=`     |
//! | `process_records`  | `POST /v1alpha/catalogs/files/processAsync`                   |
//!
//! ## Design Notes
//!
//! - The service encodes 64-bit integers as JSON strings; size fields accept
//!   either form.
//! - Errors are [`ArtifactError`]s wrapped in `anyhow` with endpoint context.
//! - Listed files are parsed one by one. An entry that does not parse is
//!   skipped and counted on the page instead of failing the listing.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use kbsync_core::config::Config;
use kbsync_core::domain::{CatalogRecord, CatalogSummary, ExternalMetadata, RecordUid};
use kbsync_core::ports::{ICatalogService, NewCatalog, NewRecord, RecordPage};

use crate::client::ArtifactClient;
use crate::ArtifactError;

const API_VERSION: &str = "v1alpha";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDto {
    #[serde(default)]
    catalog_id: String,
    #[serde(default)]
    name: String,
}

impl From<CatalogDto> for CatalogSummary {
    fn from(dto: CatalogDto) -> Self {
        let display_name = if dto.name.is_empty() {
            dto.catalog_id.clone()
        } else {
            dto.name
        };
        Self {
            id: dto.catalog_id,
            display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListCatalogsResponse {
    #[serde(default)]
    catalogs: Vec<CatalogDto>,
}

#[derive(Debug, Serialize)]
struct CreateCatalogRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    tags: &'a [String],
}

#[derive(Debug, Deserialize)]
struct CreateCatalogResponse {
    catalog: CatalogDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileDto {
    file_uid: String,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    file_type: String,
    #[serde(default)]
    create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    update_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "int64_from_any")]
    size: i64,
    #[serde(default)]
    external_metadata: Option<Map<String, Value>>,
}

/// Parses one listed file, independently of its neighbours
fn parse_listed_file(value: Value) -> Result<CatalogRecord, ArtifactError> {
    let dto: FileDto = serde_json::from_value(value)
        .map_err(|e| ArtifactError::InvalidResponse(e.to_string()))?;
    CatalogRecord::try_from(dto)
}

impl TryFrom<FileDto> for CatalogRecord {
    type Error = ArtifactError;

    fn try_from(dto: FileDto) -> Result<Self, Self::Error> {
        let uid = RecordUid::new(dto.file_uid)
            .map_err(|e| ArtifactError::InvalidResponse(e.to_string()))?;
        Ok(Self {
            uid,
            display_name: dto.name,
            file_type: dto.file_type,
            create_time: dto.create_time,
            update_time: dto.update_time,
            size: dto.size,
            external_metadata: dto.external_metadata.map(ExternalMetadata::from_map),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFilesResponse {
    #[serde(default)]
    files: Vec<Value>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadFileRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    file_type: &'static str,
    content: &'a str,
    external_metadata: &'a ExternalMetadata,
}

#[derive(Debug, Deserialize)]
struct UploadFileResponse {
    file: FileDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessFilesRequest<'a> {
    file_uids: Vec<&'a str>,
}

/// Accepts an int64 encoded as a JSON number or string
fn int64_from_any<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("size out of range: {n}"))),
        Value::String(s) if s.is_empty() => Ok(0),
        Value::String(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid size: {s}"))),
        other => Err(serde::de::Error::custom(format!("invalid size: {other}"))),
    }
}

// ============================================================================
// ArtifactCatalogService
// ============================================================================

/// [`ICatalogService`] backed by the artifact REST API
pub struct ArtifactCatalogService {
    client: ArtifactClient,
    page_size: u32,
}

impl ArtifactCatalogService {
    /// Creates a service over an existing client
    pub fn new(client: ArtifactClient, page_size: u32) -> Self {
        Self { client, page_size }
    }

    /// Creates a service from the `catalog` and `sync` configuration sections
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ArtifactClient::new(&config.catalog)?;
        Ok(Self::new(client, config.sync.page_size))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ArtifactError> {
        let response = self
            .client
            .execute_with_retry(|| self.client.request(Method::GET, segments).query(query))
            .await?;
        response
            .json()
            .await
            .map_err(|e| ArtifactError::InvalidResponse(e.to_string()))
    }

    async fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ArtifactError> {
        let response = self
            .client
            .execute_with_retry(|| self.client.request(Method::POST, segments).json(body))
            .await?;
        response
            .json()
            .await
            .map_err(|e| ArtifactError::InvalidResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ICatalogService for ArtifactCatalogService {
    async fn list_catalogs(&self, namespace: &str) -> Result<Vec<CatalogSummary>> {
        debug!(namespace, "ArtifactCatalogService::list_catalogs");
        let response: ListCatalogsResponse = self
            .get_json(&[API_VERSION, "namespaces", namespace, "catalogs"], &[])
            .await
            .with_context(|| format!("GET catalogs of namespace '{namespace}' failed"))?;
        Ok(response.catalogs.into_iter().map(Into::into).collect())
    }

    async fn create_catalog(&self, namespace: &str, catalog: &NewCatalog) -> Result<CatalogSummary> {
        debug!(namespace, name = %catalog.display_name, "ArtifactCatalogService::create_catalog");
        let body = CreateCatalogRequest {
            name: &catalog.display_name,
            description: catalog.description.as_deref(),
            tags: &catalog.tags,
        };
        let response: CreateCatalogResponse = self
            .post_json(&[API_VERSION, "namespaces", namespace, "catalogs"], &body)
            .await
            .with_context(|| format!("POST catalog '{}' failed", catalog.display_name))?;
        Ok(response.catalog.into())
    }

    async fn list_records(
        &self,
        namespace: &str,
        catalog_id: &str,
        page_token: Option<&str>,
    ) -> Result<RecordPage> {
        debug!(namespace, catalog_id, ?page_token, "ArtifactCatalogService::list_records");
        let mut query = vec![("pageSize", self.page_size.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        let response: ListFilesResponse = self
            .get_json(
                &[API_VERSION, "namespaces", namespace, "catalogs", catalog_id, "files"],
                &query,
            )
            .await
            .with_context(|| format!("GET files of catalog '{catalog_id}' failed"))?;

        let mut records = Vec::with_capacity(response.files.len());
        let mut malformed = 0usize;
        for value in response.files {
            match parse_listed_file(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(catalog_id, error = %e, "Skipping malformed file in listing");
                    malformed += 1;
                }
            }
        }

        Ok(RecordPage {
            records,
            next_page_token: response.next_page_token,
            malformed,
        })
    }

    async fn create_record(
        &self,
        namespace: &str,
        catalog_id: &str,
        record: &NewRecord,
    ) -> Result<CatalogRecord> {
        debug!(namespace, catalog_id, name = %record.display_name, "ArtifactCatalogService::create_record");
        let body = UploadFileRequest {
            name: &record.display_name,
            file_type: record.file_type.as_wire_str(),
            content: &record.content,
            external_metadata: &record.external_metadata,
        };
        let response: UploadFileResponse = self
            .post_json(
                &[API_VERSION, "namespaces", namespace, "catalogs", catalog_id, "files"],
                &body,
            )
            .await
            .with_context(|| format!("POST file '{}' failed", record.display_name))?;
        Ok(CatalogRecord::try_from(response.file)?)
    }

    async fn delete_record(&self, namespace: &str, uid: &RecordUid) -> Result<()> {
        debug!(namespace, %uid, "ArtifactCatalogService::delete_record");
        let segments = [API_VERSION, "namespaces", namespace, "catalogs", "files"];
        self.client
            .execute_with_retry(|| {
                self.client
                    .request(Method::DELETE, &segments)
                    .query(&[("fileUid", uid.as_str())])
            })
            .await
            .with_context(|| format!("DELETE file '{uid}' failed"))?;
        Ok(())
    }

    async fn process_records(&self, uids: &[RecordUid]) -> Result<()> {
        debug!(count = uids.len(), "ArtifactCatalogService::process_records");
        let body = ProcessFilesRequest {
            file_uids: uids.iter().map(RecordUid::as_str).collect(),
        };
        let _: Value = self
            .post_json(&[API_VERSION, "catalogs", "files", "processAsync"], &body)
            .await
            .context("POST processAsync failed")?;
        Ok(())
    }
}
