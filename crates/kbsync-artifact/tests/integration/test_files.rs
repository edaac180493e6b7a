//! Integration tests for file listing, upload, deletion, and processing

use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, ResponseTemplate,
};

use std::sync::Arc;

use kbsync_core::domain::{
    ExclusionReason, ExternalFile, ExternalId, ExternalMetadata, FileType, RecordUid,
    SourceClassifier, GOOGLE_DRIVE,
};
use kbsync_core::ports::{ICatalogService, NewRecord};
use kbsync_core::usecases::LoadSnapshotUseCase;

use crate::common::{self, CATALOG, NAMESPACE};

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_records_first_page() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("GET"))
        .and(path(common::files_path()))
        .and(query_param("pageSize", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [common::file_json("uid-1", "f1"), common::file_json("uid-2", "f2")],
            "nextPageToken": "page-2",
            "totalSize": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = service.list_records(NAMESPACE, CATALOG, None).await.unwrap();

    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[0].uid.as_str(), "uid-1");
    assert_eq!(page.records[0].size, 1024);
    assert_eq!(page.records[1].external_id(), Some("f2"));
    assert_eq!(page.next_token(), Some("page-2"));
}

#[tokio::test]
async fn test_list_records_passes_page_token() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("GET"))
        .and(path(common::files_path()))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [common::file_json("uid-3", "f3")],
            "nextPageToken": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = service
        .list_records(NAMESPACE, CATALOG, Some("page-2"))
        .await
        .unwrap();

    assert_eq!(page.records.len(), 1);
    assert_eq!(page.next_token(), None);
}

#[tokio::test]
async fn test_list_records_keeps_files_without_metadata() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("GET"))
        .and(path(common::files_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"fileUid": "uid-9", "name": "manual.txt", "type": "FILE_TYPE_TEXT", "size": 3}]
        })))
        .mount(&server)
        .await;

    let page = service.list_records(NAMESPACE, CATALOG, None).await.unwrap();
    assert!(page.records[0].external_metadata.is_none());
    assert_eq!(page.next_token(), None);
}

#[tokio::test]
async fn test_list_records_skips_malformed_entries() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("GET"))
        .and(path(common::files_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                {"fileUid": "", "externalMetadata": {"id": "x", "web-view-link": "https://example.com/x"}},
                common::file_json("uid-1", "f1"),
                {"fileUid": "uid-2", "size": "a lot"},
                common::file_json("uid-3", "f3")
            ],
            "nextPageToken": ""
        })))
        .mount(&server)
        .await;

    let page = service.list_records(NAMESPACE, CATALOG, None).await.unwrap();

    let uids: Vec<_> = page.records.iter().map(|r| r.uid.as_str()).collect();
    assert_eq!(uids, vec!["uid-1", "uid-3"]);
    assert_eq!(page.malformed, 2);
}

#[tokio::test]
async fn test_snapshot_survives_malformed_entries() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("GET"))
        .and(path(common::files_path()))
        .and(query_param("pageSize", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                {"fileUid": ""},
                common::file_json("uid-1", "f1")
            ],
            "nextPageToken": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let index = LoadSnapshotUseCase::new(Arc::new(service))
        .execute(NAMESPACE, CATALOG, &SourceClassifier::default(), GOOGLE_DRIVE)
        .await
        .unwrap();

    let f1 = ExternalId::new("f1".to_string()).unwrap();
    assert_eq!(index.get(&f1).unwrap().uid.as_str(), "uid-1");
    assert_eq!(index.excluded(ExclusionReason::Malformed), 1);
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_create_record_sends_payload_and_metadata() {
    let (server, service) = common::setup_artifact_mock().await;

    let file = ExternalFile {
        id: "f1".to_string(),
        name: "f1.pdf".to_string(),
        modified_time: "2024-04-30T08:00:00Z".to_string(),
        size: 1024,
        version: 3,
        web_view_link: "https://drive.google.com/file/d/f1/view".to_string(),
        ..Default::default()
    };
    let metadata = ExternalMetadata::from_file(&file);

    Mock::given(method("POST"))
        .and(path(common::files_path()))
        .and(body_json(json!({
            "name": "f1.pdf",
            "type": "FILE_TYPE_PDF",
            "content": "JVBERi0xLjQ=",
            "externalMetadata": serde_json::to_value(&metadata).unwrap()
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": common::file_json("new-uid", "f1")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = service
        .create_record(
            NAMESPACE,
            CATALOG,
            &NewRecord {
                display_name: "f1.pdf".to_string(),
                file_type: FileType::Pdf,
                content: "JVBERi0xLjQ=".to_string(),
                external_metadata: metadata,
            },
        )
        .await
        .unwrap();

    assert_eq!(record.uid.as_str(), "new-uid");
    assert_eq!(record.external_id(), Some("f1"));
}

#[tokio::test]
async fn test_create_record_server_error() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("POST"))
        .and(path(common::files_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage unavailable"))
        .mount(&server)
        .await;

    let err = service
        .create_record(
            NAMESPACE,
            CATALOG,
            &NewRecord {
                display_name: "f1.pdf".to_string(),
                file_type: FileType::Pdf,
                content: String::new(),
                external_metadata: ExternalMetadata::default(),
            },
        )
        .await
        .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("POST file 'f1.pdf' failed"), "{message}");
    assert!(message.contains("500"), "{message}");
}

// ============================================================================
// Delete and processing
// ============================================================================

#[tokio::test]
async fn test_delete_record_uses_file_uid_query() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v1alpha/namespaces/{NAMESPACE}/catalogs/files")))
        .and(query_param("fileUid", "uid-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let uid = RecordUid::new("uid-1".to_string()).unwrap();
    service.delete_record(NAMESPACE, &uid).await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_record_is_an_error() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v1alpha/namespaces/{NAMESPACE}/catalogs/files")))
        .respond_with(ResponseTemplate::new(404).set_body_string("file not found"))
        .mount(&server)
        .await;

    let uid = RecordUid::new("uid-404".to_string()).unwrap();
    let err = service.delete_record(NAMESPACE, &uid).await.unwrap_err();
    assert!(format!("{err:#}").contains("Not found"));
}

#[tokio::test]
async fn test_process_records_posts_all_uids() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("POST"))
        .and(path("/v1alpha/catalogs/files/processAsync"))
        .and(body_json(json!({"fileUids": ["uid-1", "uid-2"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
        .expect(1)
        .mount(&server)
        .await;

    let uids = vec![
        RecordUid::new("uid-1".to_string()).unwrap(),
        RecordUid::new("uid-2".to_string()).unwrap(),
    ];
    service.process_records(&uids).await.unwrap();
}
