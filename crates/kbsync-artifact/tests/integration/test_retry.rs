//! Integration tests for throttling (429) handling

use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use kbsync_core::ports::ICatalogService;

use crate::common::{self, NAMESPACE};

#[tokio::test]
async fn test_throttled_request_is_retried() {
    let (server, service) = common::setup_artifact_mock().await;

    Mock::given(method("GET"))
        .and(path(common::catalogs_path()))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(common::catalogs_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "catalogs": [{"catalogId": "kb", "name": "kb"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let catalogs = service.list_catalogs(NAMESPACE).await.unwrap();
    assert_eq!(catalogs.len(), 1);
}

#[tokio::test]
async fn test_retry_budget_is_bounded() {
    let (server, service) = common::setup_artifact_mock().await;

    // initial attempt plus two retries
    Mock::given(method("GET"))
        .and(path(common::catalogs_path()))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let err = service.list_catalogs(NAMESPACE).await.unwrap_err();
    assert!(format!("{err:#}").contains("Too many requests"));
}
