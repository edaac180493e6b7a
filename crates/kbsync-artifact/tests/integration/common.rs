//! Shared test helpers for artifact API integration tests
//!
//! Each helper starts a mock server and returns an adapter pointing at it.

use serde_json::{json, Value};
use wiremock::MockServer;

use kbsync_artifact::client::ArtifactClient;
use kbsync_artifact::provider::ArtifactCatalogService;

pub const NAMESPACE: &str = "namespace123";
pub const CATALOG: &str = "catalog-id123";
pub const TOKEN: &str = "test-api-token";

/// Starts a mock server and returns a (MockServer, ArtifactCatalogService) tuple.
///
/// The client sends a bearer token and both user-context headers, retries
/// throttled requests twice, and lists files two at a time.
pub async fn setup_artifact_mock() -> (MockServer, ArtifactCatalogService) {
    let server = MockServer::start().await;
    let client = ArtifactClient::with_base_url(Some(TOKEN.to_string()), server.uri())
        .with_user_context(Some("user-uid123".to_string()), Some("requester-uid123".to_string()))
        .with_max_retries(2);
    (server, ArtifactCatalogService::new(client, 2))
}

/// JSON for a file as the catalog returns it
pub fn file_json(uid: &str, external_id: &str) -> Value {
    json!({
        "fileUid": uid,
        "name": format!("{external_id}.pdf"),
        "type": "FILE_TYPE_PDF",
        "createTime": "2024-05-01T10:00:00Z",
        "updateTime": "2024-05-01T10:00:00Z",
        "size": "1024",
        "externalMetadata": {
            "id": external_id,
            "web-view-link": format!("https://drive.google.com/file/d/{external_id}/view"),
            "modified-time": "2024-04-30T08:00:00Z",
            "size": 1024,
            "version": 3
        }
    })
}

/// Base path for a namespace's catalogs
pub fn catalogs_path() -> String {
    format!("/v1alpha/namespaces/{NAMESPACE}/catalogs")
}

/// Base path for a catalog's files
pub fn files_path() -> String {
    format!("/v1alpha/namespaces/{NAMESPACE}/catalogs/{CATALOG}/files")
}
