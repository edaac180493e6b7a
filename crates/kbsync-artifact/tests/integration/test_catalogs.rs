//! Integration tests for catalog listing and creation

use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, ResponseTemplate,
};

use kbsync_core::ports::{ICatalogService, NewCatalog};

use crate::common::{self, NAMESPACE, TOKEN};

#[tokio::test]
async fn test_list_catalogs_maps_ids_and_names() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("GET"))
        .and(path(common::catalogs_path()))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .and(header("Instill-User-Uid", "user-uid123"))
        .and(header("Instill-Requester-Uid", "requester-uid123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "catalogs": [
                {"catalogUid": "c-1", "catalogId": "kb", "name": "kb", "description": ""},
                {"catalogUid": "c-2", "catalogId": "other"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalogs = service.list_catalogs(NAMESPACE).await.unwrap();

    assert_eq!(catalogs.len(), 2);
    assert_eq!(catalogs[0].id, "kb");
    assert_eq!(catalogs[0].display_name, "kb");
    assert_eq!(catalogs[1].display_name, "other");
}

#[tokio::test]
async fn test_list_catalogs_tolerates_empty_body() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("GET"))
        .and(path(common::catalogs_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(service.list_catalogs(NAMESPACE).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_catalog_sends_name_description_and_tags() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("POST"))
        .and(path(common::catalogs_path()))
        .and(body_json(json!({
            "name": "kb",
            "description": "drive mirror",
            "tags": ["drive"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "catalog": {"catalogUid": "c-1", "catalogId": "kb", "name": "kb"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = service
        .create_catalog(
            NAMESPACE,
            &NewCatalog {
                display_name: "kb".to_string(),
                description: Some("drive mirror".to_string()),
                tags: vec!["drive".to_string()],
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, "kb");
}

#[tokio::test]
async fn test_unauthorized_is_reported() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("GET"))
        .and(path(common::catalogs_path()))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let err = service.list_catalogs(NAMESPACE).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Unauthorized: token expired"), "{message}");
}
