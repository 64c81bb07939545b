//! End-to-end tests of the default clients against a mock HTTP server.

use futures::TryStreamExt;
use genai::config::{user_agent_tag, ConfigureOptions};
use genai::model::{
    Content, GenerateContentRequest, GenerateMessageRequest, GenerateTextRequest,
    ListModelsRequest, Message, MessagePrompt,
};
use genai::options::{ClientInfo, ClientOptions, Credentials, Transport};
use genai::retriever;
use genai::safety::{normalize_safety_settings, HarmCategorySet};
use genai::{ClientError, ClientManager, Metadata};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// A manager that never reads the process environment.
fn manager() -> ClientManager {
    ClientManager::new().with_api_key_source(|| None)
}

fn endpoint(server: &MockServer) -> ClientOptions {
    ClientOptions::new().with_api_endpoint(server.uri())
}

#[tokio::test]
async fn test_generate_content_sends_key_user_agent_and_merged_metadata() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(header("x-goog-api-client", user_agent_tag().as_str()))
        .and(header("user-agent", format!("my-app {}", user_agent_tag()).as_str()))
        .and(header("x-request-id", "42"))
        .and(header("x-team", "search"))
        .and(body_json(json!({
            "contents": [{"parts": [{"text": "Hello"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hi there"}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager();
    manager
        .configure(
            ConfigureOptions::new()
                .with_api_key("test-key")
                .with_client_options(endpoint(&mock_server))
                .with_client_info(ClientInfo::new().with_user_agent("my-app"))
                .with_default_metadata([("x-team", "search")]),
        )
        .unwrap();

    let client = manager.generative_async_client().unwrap();
    let request = GenerateContentRequest {
        model: "models/gemini-pro".to_string(),
        contents: vec![Content::from("Hello")],
        ..GenerateContentRequest::default()
    };
    let response = client
        .generate_content(request, Metadata::new().with("x-request-id", "42"))
        .await
        .unwrap();

    let content = response.candidates[0].content.clone().unwrap();
    assert_eq!(content.parts[0].text, "Hi there");
    assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
}

#[tokio::test]
async fn test_credentials_send_bearer_token_and_quota_project() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(header("authorization", "Bearer access-token"))
        .and(header("x-goog-user-project", "billing-project"))
        .and(query_param("pageSize", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{
                "name": "models/gemini-pro",
                "inputTokenLimit": 30720,
                "supportedGenerationMethods": ["generateContent", "countTokens"]
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager();
    manager
        .configure(
            ConfigureOptions::new()
                .with_credentials(
                    Credentials::new("access-token").with_quota_project("billing-project"),
                )
                .with_client_options(endpoint(&mock_server)),
        )
        .unwrap();

    let client = manager.model_async_client().unwrap();
    let response = client
        .list_models(
            ListModelsRequest {
                page_size: Some(5),
                page_token: None,
            },
            Metadata::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.models.len(), 1);
    assert_eq!(response.models[0].input_token_limit, Some(30720));
}

#[tokio::test]
async fn test_operations_client_shares_model_endpoint() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/tunedModels/my-model/operations/op-1"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "tunedModels/my-model/operations/op-1",
            "done": false
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/tunedModels/my-model/operations/op-1:cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager();
    manager
        .configure(
            ConfigureOptions::new()
                .with_api_key("test-key")
                .with_client_options(endpoint(&mock_server)),
        )
        .unwrap();

    let operations = manager.model_async_client().unwrap().operations_client();
    let operation = operations
        .get_operation("tunedModels/my-model/operations/op-1", Metadata::new())
        .await
        .unwrap();
    assert!(!operation.done);

    operations
        .cancel_operation(&operation.name, Metadata::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_corpus_lifecycle() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/corpora"))
        .and(body_json(json!({"name": "corpora/demo", "displayName": "Demo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "corpora/demo",
            "displayName": "Demo",
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/corpora/demo"))
        .and(query_param("force", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager();
    manager
        .configure(
            ConfigureOptions::new()
                .with_api_key("test-key")
                .with_client_options(endpoint(&mock_server)),
        )
        .unwrap();
    let client = manager.retriever_async_client().unwrap();

    let corpus = retriever::create_corpus("demo", Some("Demo"), Some(client.clone()))
        .await
        .unwrap();
    assert_eq!(corpus.name, "corpora/demo");
    assert!(corpus.create_time.is_some());

    retriever::delete_corpus(&corpus.name, true, Some(client))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_corpora_walks_every_page() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/corpora"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "corpora": [{"name": "corpora/c"}]
        })))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/corpora"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "corpora": [{"name": "corpora/a"}, {"name": "corpora/b"}],
            "nextPageToken": "page-2"
        })))
        .mount(&mock_server)
        .await;

    let manager = manager();
    manager
        .configure(
            ConfigureOptions::new()
                .with_api_key("test-key")
                .with_client_options(endpoint(&mock_server)),
        )
        .unwrap();
    let client = manager.retriever_async_client().unwrap();

    let names: Vec<String> = retriever::list_corpora(Some(2), Some(client))
        .unwrap()
        .map_ok(|corpus| corpus.name)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(names, vec!["corpora/a", "corpora/b", "corpora/c"]);
}

#[tokio::test]
async fn test_error_body_is_mapped() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/corpora/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Corpus not found", "status": "NOT_FOUND"}
        })))
        .mount(&mock_server)
        .await;

    let manager = manager();
    manager
        .configure(
            ConfigureOptions::new()
                .with_api_key("test-key")
                .with_client_options(endpoint(&mock_server)),
        )
        .unwrap();
    let client = manager.retriever_async_client().unwrap();

    let result = retriever::get_corpus("corpora/missing", Some(client)).await;

    assert!(matches!(
        result,
        Err(ClientError::ProviderError(msg)) if msg == "404: Corpus not found"
    ));
}

#[tokio::test]
async fn test_grpc_transport_fails_at_construction() {
    let manager = manager();
    manager
        .configure(ConfigureOptions::new().with_transport(Transport::Grpc))
        .unwrap();

    assert!(matches!(
        manager.get_default_client("generative_async"),
        Err(ClientError::Config(_))
    ));
}

#[tokio::test]
async fn test_generate_text_with_old_safety_categories() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/text-bison-001:generateText"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_json(json!({
            "prompt": {"text": "Tell me a story"},
            "safetySettings": [
                {"category": "HARM_CATEGORY_TOXICITY", "threshold": "BLOCK_LOW_AND_ABOVE"},
                {"category": "HARM_CATEGORY_MEDICAL", "threshold": "BLOCK_NONE"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"output": "Once upon a time"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager();
    manager
        .configure(
            ConfigureOptions::new()
                .with_api_key("test-key")
                .with_client_options(endpoint(&mock_server)),
        )
        .unwrap();

    let safety_settings =
        normalize_safety_settings([("toxic", "low"), ("medical", "4")], HarmCategorySet::Old)
            .unwrap();
    let request = GenerateTextRequest {
        model: "models/text-bison-001".to_string(),
        prompt: "Tell me a story".into(),
        safety_settings,
        ..GenerateTextRequest::default()
    };
    let response = manager
        .text_async_client()
        .unwrap()
        .generate_text(request, Metadata::new())
        .await
        .unwrap();

    assert_eq!(response.candidates[0].output, "Once upon a time");
}

#[tokio::test]
async fn test_generate_message_sends_default_metadata() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/chat-bison-001:generateMessage"))
        .and(header("x-team", "search"))
        .and(body_json(json!({
            "prompt": {"context": "Be brief", "messages": [{"content": "Hello"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"author": "1", "content": "Hi!"}],
            "messages": [{"author": "0", "content": "Hello"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager();
    manager
        .configure(
            ConfigureOptions::new()
                .with_api_key("test-key")
                .with_client_options(endpoint(&mock_server))
                .with_default_metadata([("x-team", "search")]),
        )
        .unwrap();

    let request = GenerateMessageRequest {
        model: "models/chat-bison-001".to_string(),
        prompt: MessagePrompt {
            context: Some("Be brief".to_string()),
            messages: vec![Message::new("Hello")],
            ..MessagePrompt::default()
        },
        ..GenerateMessageRequest::default()
    };
    let response = manager
        .discuss_async_client()
        .unwrap()
        .generate_message(request, Metadata::new())
        .await
        .unwrap();

    assert_eq!(response.candidates[0].content, "Hi!");
    assert_eq!(response.messages.len(), 1);
}
