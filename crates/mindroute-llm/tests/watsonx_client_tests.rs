use mindroute_llm::watsonx::WatsonxClient;
use mindroute_llm::{ChatClient, ChatClientExt, ChatRequest, LlmError, Message, ResponseFormat};
use mockito::{Matcher, Server, ServerGuard};
use serde::Deserialize;
use serde_json::json;

const MODEL: &str = "meta-llama/llama-3-3-70b-instruct";

fn chat_body(content: &str) -> String {
    json!({
        "id": "chat-1",
        "model_id": MODEL,
        "created": 1_700_000_000,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
    })
    .to_string()
}

async fn mock_iam(server: &mut ServerGuard, hits: usize) -> mockito::Mock {
    server
        .mock("POST", "/identity/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "grant_type".into(),
                "urn:ibm:params:oauth:grant-type:apikey".into(),
            ),
            Matcher::UrlEncoded("apikey".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "iam-token",
                "token_type": "Bearer",
                "expires_in": 3600,
                "expiration": 4_102_444_800i64
            })
            .to_string(),
        )
        .expect(hits)
        .create_async()
        .await
}

fn client_for(server: &ServerGuard) -> WatsonxClient {
    WatsonxClient::builder()
        .api_key("test-key")
        .project_id("proj-1")
        .url(server.url())
        .iam_url(server.url())
        .build()
        .unwrap()
}

#[test]
fn test_watsonx_builder_success() {
    let result = WatsonxClient::builder()
        .api_key("test-key")
        .project_id("proj-1")
        .build();

    assert!(result.is_ok());
}

#[test]
fn test_watsonx_builder_missing_api_key() {
    let result = WatsonxClient::builder().project_id("proj-1").build();

    let err_msg = result.err().unwrap().to_string();
    assert!(err_msg.contains("API key"));
}

#[test]
fn test_watsonx_builder_missing_project_id() {
    let result = WatsonxClient::builder().api_key("test-key").build();

    let err_msg = result.err().unwrap().to_string();
    assert!(err_msg.contains("Project ID"));
}

#[tokio::test]
async fn test_chat_exchanges_token_once() {
    let mut server = Server::new_async().await;
    let iam = mock_iam(&mut server, 1).await;
    let chat = server
        .mock("POST", "/ml/v1/text/chat")
        .match_query(Matcher::UrlEncoded("version".into(), "2023-05-29".into()))
        .match_header("authorization", "Bearer iam-token")
        .match_body(Matcher::PartialJson(json!({
            "model_id": MODEL,
            "project_id": "proj-1",
            "messages": [{ "role": "user", "content": "Hello" }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body("Hi there!"))
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);

    for _ in 0..2 {
        let response = client
            .chat(ChatRequest::new(MODEL, vec![Message::human("Hello")]))
            .await
            .unwrap();
        assert_eq!(response.text().unwrap(), "Hi there!");
        assert_eq!(response.usage.unwrap().total_tokens, 17);
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }

    iam.assert_async().await;
    chat.assert_async().await;
}

#[tokio::test]
async fn test_api_error_status_is_reported() {
    let mut server = Server::new_async().await;
    let _iam = mock_iam(&mut server, 1).await;
    let _chat = server
        .mock("POST", "/ml/v1/text/chat")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("model unavailable")
        .create_async()
        .await;

    let err = client_for(&server)
        .chat(ChatRequest::new(MODEL, vec![Message::human("Hello")]))
        .await
        .unwrap_err();

    match err {
        LlmError::Api { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "model unavailable");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_api_key_is_auth_error() {
    let mut server = Server::new_async().await;
    let _iam = server
        .mock("POST", "/identity/token")
        .with_status(400)
        .with_body(r#"{"errorCode":"BXNIM0415E","errorMessage":"Provided API key could not be found."}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .chat(ChatRequest::new(MODEL, vec![Message::human("Hello")]))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Auth(_)));
}

#[derive(Debug, Deserialize)]
struct Mood {
    mood: String,
}

#[tokio::test]
async fn test_structured_chat_uses_json_mode() {
    let mut server = Server::new_async().await;
    let _iam = mock_iam(&mut server, 1).await;
    let chat = server
        .mock("POST", "/ml/v1/text/chat")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "response_format": { "type": "json_object" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body(r#"{"mood": "calm"}"#))
        .create_async()
        .await;

    let format = ResponseFormat::new(
        "mood",
        json!({
            "type": "object",
            "properties": { "mood": { "type": "string" } },
            "required": ["mood"]
        }),
    );

    let mood: Mood = client_for(&server)
        .chat_structured(ChatRequest::new(MODEL, vec![Message::human("How do I feel?")]), format)
        .await
        .unwrap();

    assert_eq!(mood.mood, "calm");
    chat.assert_async().await;
}
