//! Integration tests for the REST resources using wiremock.

use agentdesk::api::{agents, Resource};
use agentdesk::chat::ChatStore;
use agentdesk::client::{ApiClient, ClientError};
use agentdesk::model::PaginationParams;
use agentdesk::options::ClientOptions;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let options = ClientOptions::new(format!("{}/api", server.uri())).with_token("test-token");
    ApiClient::new(options).unwrap()
}

fn conversation(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "user_id": "u1",
        "type": "model",
        "model_id": "llama3",
        "title": format!("conversation {}", id),
        "status": status,
        "created_at": "2024-05-01T08:00:00",
        "updated_at": null,
    })
}

#[tokio::test]
async fn list_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/agents"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [
                {"id": "a1", "name": "Helper", "status": "active"},
                {"id": "a2", "name": "Old", "status": "deleted"},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client.agents().list().await.unwrap();
    assert_eq!(page.items.len(), 2);

    let visible = agents::listable(page.items);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "a1");
}

#[tokio::test]
async fn envelope_failure_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/agents/missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "Agent not found",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.agents().get("missing").await.unwrap_err();
    match err {
        ClientError::Api(message) => assert_eq!(message, "Agent not found"),
        other => panic!("expected api error, got {:?}", other),
    }
}

#[tokio::test]
async fn error_status_carries_envelope_message() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/plugins/p1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "success": false,
            "message": "Forbidden",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.plugins().delete("p1").await.unwrap_err();
    match err {
        ClientError::Transport { status, body } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(body, "Forbidden");
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn conversation_list_updates_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "items": [conversation("c1", "active"), conversation("c2", "archived")],
                "total": 12,
                "page": 2,
                "page_size": 2,
                "pages": 6,
            },
        })))
        .mount(&server)
        .await;

    let mut store = ChatStore::new(client_for(&server));
    store.get_conversations().await.unwrap();

    assert_eq!(store.conversations().len(), 2);
    let pagination = store.pagination();
    assert_eq!(pagination.page, 2);
    assert_eq!(pagination.total, 12);
    assert_eq!(pagination.pages, 6);

    assert_eq!(store.active_conversations().count(), 1);
    assert_eq!(store.archived_conversations().count(), 1);
}

#[tokio::test]
async fn conversation_list_accepts_bare_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [conversation("c1", "active")],
        })))
        .mount(&server)
        .await;

    let mut store = ChatStore::new(client_for(&server));
    store.get_conversations().await.unwrap();

    assert_eq!(store.conversations().len(), 1);
    assert_eq!(store.pagination().total, 1);
}

#[tokio::test]
async fn failed_conversation_reload_empties_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [conversation("c1", "active")],
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/chat/conversations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let mut store = ChatStore::new(client_for(&server));
    store.get_conversations().await.unwrap();
    assert_eq!(store.conversations().len(), 1);

    assert!(store.get_conversations().await.is_err());
    assert!(store.conversations().is_empty());
}

#[tokio::test]
async fn messages_default_to_first_page_of_fifty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat/conversations/c1/messages"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [
                {"id": "m1", "conversation_id": "c1", "content": "hi", "type": "user"},
                {"id": "m2", "conversation_id": "c1", "content": "hello", "type": "assistant"},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = ChatStore::new(client_for(&server));
    store
        .get_messages("c1", PaginationParams::default())
        .await
        .unwrap();

    assert_eq!(store.messages().len(), 2);
    assert_eq!(store.messages()[1].content, "hello");
}

#[tokio::test]
async fn ollama_models_pass_server_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models/ollama/models"))
        .and(query_param("server_url", "http://gpu-box:11434"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": ["llama3:8b", "qwen2:7b"],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let names = client
        .models()
        .ollama_models(Some("http://gpu-box:11434"))
        .await
        .unwrap();
    assert_eq!(names, vec!["llama3:8b", "qwen2:7b"]);
}

#[tokio::test]
async fn ollama_pull_defaults_to_local_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/models/ollama/pull"))
        .and(body_json(serde_json::json!({
            "model_name": "llama3:8b",
            "server_url": "http://localhost:11434",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {"status": "pulling"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reply = client
        .models()
        .pull_ollama_model("llama3:8b", None)
        .await
        .unwrap();
    assert_eq!(reply["status"], "pulling");
}

#[tokio::test]
async fn update_without_data_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/workflows/w1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "updated",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let updated = client
        .workflows()
        .update("w1", &serde_json::json!({"name": "renamed"}))
        .await
        .unwrap();
    assert!(updated.is_none());
}
