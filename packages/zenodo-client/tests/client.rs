use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zenodo_client::{Creator, DepositionMetadata, ZenodoClient, ZenodoError};

async fn client(server: &MockServer) -> ZenodoClient {
    ZenodoClient::new("secret").with_base_url(format!("{}/api/deposit", server.uri()))
}

#[tokio::test]
async fn create_deposition_posts_empty_object_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/deposit/depositions"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "doi": "",
            "state": "unsubmitted",
            "submitted": false,
            "links": {"bucket": "https://sandbox.zenodo.org/api/files/abc"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let deposition = client(&server).await.create_deposition().await.unwrap();
    assert_eq!(deposition.id, 42);
    assert_eq!(deposition.doi(), None);
}

#[tokio::test]
async fn upload_file_sends_multipart_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/deposit/depositions/42/files"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "f-1",
            "filename": "ro_crate.zip",
            "filesize": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("ro_crate.zip");
    std::fs::write(&archive, b"zip").unwrap();

    let file = client(&server).await.upload_file(42, &archive).await.unwrap();
    assert_eq!(file.filename, "ro_crate.zip");

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\"; filename=\"ro_crate.zip\""));
}

#[tokio::test]
async fn set_metadata_puts_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/deposit/depositions/42"))
        .and(body_json(json!({"metadata": {
            "title": "Sample RO-Crate",
            "upload_type": "dataset",
            "description": "desc",
            "creators": [{"name": "Doe, John"}]
        }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let metadata =
        DepositionMetadata::dataset("Sample RO-Crate", "desc", vec![Creator::new("Doe, John")]);
    client(&server)
        .await
        .set_metadata(42, &metadata)
        .await
        .unwrap();
}

#[tokio::test]
async fn publish_returns_doi() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/deposit/depositions/42/actions/publish"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "id": 42,
            "doi": "10.5072/zenodo.42",
            "state": "done",
            "submitted": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let published = client(&server).await.publish(42).await.unwrap();
    assert_eq!(published.doi(), Some("10.5072/zenodo.42"));
}

#[tokio::test]
async fn publish_without_doi_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/deposit/depositions/7/actions/publish"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"id": 7, "doi": ""})))
        .mount(&server)
        .await;

    let result = client(&server).await.publish(7).await;
    assert!(matches!(result, Err(ZenodoError::MissingDoi(7))));
}

#[tokio::test]
async fn non_success_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/deposit/depositions"))
        .respond_with(ResponseTemplate::new(403).set_body_string("invalid token"))
        .mount(&server)
        .await;

    match client(&server).await.create_deposition().await {
        Err(ZenodoError::Api { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "invalid token");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
