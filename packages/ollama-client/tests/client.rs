use ollama_client::{GenerateRequest, OllamaClient, OllamaError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn create_embedding_posts_model_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_json(json!({"model": "nomic-embed-text:v1.5", "prompt": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.5, -0.25, 1.0]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new().with_base_url(server.uri());
    let embedding = client
        .create_embedding("hello", "nomic-embed-text:v1.5")
        .await
        .unwrap();
    assert_eq!(embedding, vec![0.5, -0.25, 1.0]);
}

#[tokio::test]
async fn empty_embedding_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": []})))
        .mount(&server)
        .await;

    let client = OllamaClient::new().with_base_url(server.uri());
    let result = client.create_embedding("hello", "m").await;
    assert!(matches!(result, Err(OllamaError::Parse(_))));
}

#[tokio::test]
async fn generate_returns_response_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({
            "model": "gemma3:12b",
            "prompt": "describe",
            "stream": false,
            "options": {"temperature": 0.0}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gemma3:12b",
            "response": "```json\n{}\n```",
            "done": true,
            "total_duration": 5_000_000u64,
            "eval_count": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new().with_base_url(server.uri());
    let response = client
        .generate(GenerateRequest::new("gemma3:12b", "describe").temperature(0.0))
        .await
        .unwrap();
    assert_eq!(response.response, "```json\n{}\n```");
    assert!(response.done);
}

#[tokio::test]
async fn unknown_model_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let client = OllamaClient::new().with_base_url(server.uri());
    match client.generate(GenerateRequest::new("nope", "x")).await {
        Err(OllamaError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "model not found");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let client = OllamaClient::new().with_base_url("http://127.0.0.1:9");
    let result = client.create_embedding("hello", "m").await;
    assert!(matches!(result, Err(OllamaError::Network(_))));
}
