// OpenAI-compatible chat completions client

use crate::error::{LlmError, Result};
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
use crate::types::Message;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI client (HTTP direct, no SDK)
///
/// Works against any server exposing `/chat/completions` (vLLM, Ollama, ...)
/// through [`OpenAIClient::with_base_url`].
#[derive(Debug)]
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| LlmError::Config("Invalid API key format".to_string()))?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build chat completion request payload
    fn build_chat_request(
        &self,
        model: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
    ) -> Result<Value> {
        let mut obj = Map::new();
        obj.insert("model".to_string(), Value::from(model));
        obj.insert("messages".to_string(), serde_json::to_value(messages)?);
        obj.insert("stream".to_string(), Value::Bool(false));

        // o1 and gpt-5 models don't support temperature and use max_completion_tokens
        let is_reasoning_model = model.starts_with("o1") || model.starts_with("gpt-5");

        if let Some(temp) = options.temperature {
            if !is_reasoning_model {
                obj.insert("temperature".to_string(), serde_json::json!(temp));
            }
        }
        if let Some(max_tokens) = options.max_tokens {
            let token_field = if is_reasoning_model {
                "max_completion_tokens"
            } else {
                "max_tokens"
            };
            obj.insert(token_field.to_string(), serde_json::json!(max_tokens));
        }
        if let Some(format) = &options.response_format {
            obj.insert(
                "response_format".to_string(),
                serde_json::json!({
                    "type": "json_schema",
                    "json_schema": format,
                }),
            );
        }

        Ok(Value::Object(obj))
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, request.messages, &request.options)?;

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: "OpenAI",
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body = response.text().await?;
        let raw: OpenAIChatResponse = serde_json::from_str(&body)?;

        // Convert to provider-agnostic response
        let choice = raw.choices.into_iter().next();
        Ok(ChatResponse {
            content: choice.as_ref().and_then(|c| c.message.content.clone()),
            usage: raw.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.and_then(|c| c.finish_reason),
            model: Some(raw.model),
        })
    }
}

// ============================================================================
// OPENAI-SPECIFIC RESPONSE TYPES (for Chat Completions)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct OpenAIChatResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured::ResponseFormat;

    #[test]
    fn test_reasoning_model_parameter_names() {
        let client = OpenAIClient::new("key").unwrap();
        let payload = client
            .build_chat_request(
                "o1-mini",
                vec![Message::human("hi")],
                &ChatOptions::new().temperature(0.5).max_tokens(10),
            )
            .unwrap();

        assert!(payload.get("temperature").is_none());
        assert_eq!(payload["max_completion_tokens"], 10);
    }

    #[test]
    fn test_response_format_is_native_json_schema() {
        let client = OpenAIClient::new("key").unwrap();
        let format = ResponseFormat::new("verdict", serde_json::json!({"type": "object"})).strict(true);
        let payload = client
            .build_chat_request(
                "gpt-4o",
                vec![Message::human("hi")],
                &ChatOptions::new().response_format(format),
            )
            .unwrap();

        assert_eq!(payload["response_format"]["type"], "json_schema");
        assert_eq!(payload["response_format"]["json_schema"]["name"], "verdict");
        assert_eq!(payload["response_format"]["json_schema"]["strict"], true);
        assert_eq!(payload["messages"].as_array().unwrap().len(), 1);
    }
}
