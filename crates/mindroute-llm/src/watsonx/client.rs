// IBM watsonx.ai chat client implementation

use crate::error::{LlmError, Result};
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
use crate::types::Message;
use crate::watsonx::auth::IamTokenProvider;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_WATSONX_URL: &str = "https://us-south.ml.cloud.ibm.com";
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";
pub const DEFAULT_API_VERSION: &str = "2023-05-29";
pub const DEFAULT_MODEL_ID: &str = "meta-llama/llama-3-3-70b-instruct";

/// watsonx.ai client (HTTP direct, no SDK)
///
/// Differences from OpenAI:
/// - Auth: API key is exchanged for an IAM bearer token (cached)
/// - URL: {url}/ml/v1/text/chat?version={api_version}
/// - Every request carries `model_id` and `project_id` in the body
/// - Structured output only as JSON mode; the schema travels as a system instruction
#[derive(Debug)]
pub struct WatsonxClient {
    http_client: reqwest::Client,
    url: String,
    project_id: String,
    api_version: String,
    auth: IamTokenProvider,
}

impl WatsonxClient {
    pub fn builder() -> WatsonxClientBuilder {
        WatsonxClientBuilder::default()
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Build chat request payload
    fn build_chat_request(
        &self,
        model: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
    ) -> Result<Value> {
        let mut messages = messages;
        if let Some(format) = &options.response_format {
            messages.insert(0, Message::system(format.instruction()));
        }

        let mut obj = Map::new();
        obj.insert("model_id".to_string(), Value::from(model));
        obj.insert("project_id".to_string(), Value::from(self.project_id.as_str()));
        obj.insert("messages".to_string(), serde_json::to_value(messages)?);

        if let Some(temp) = options.temperature {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }
        if options.response_format.is_some() {
            obj.insert(
                "response_format".to_string(),
                serde_json::json!({ "type": "json_object" }),
            );
        }

        Ok(Value::Object(obj))
    }

    fn chat_url(&self) -> String {
        format!("{}/ml/v1/text/chat?version={}", self.url, self.api_version)
    }
}

/// Builder for WatsonxClient
#[derive(Default)]
pub struct WatsonxClientBuilder {
    api_key: Option<String>,
    project_id: Option<String>,
    url: Option<String>,
    iam_url: Option<String>,
    api_version: Option<String>,
}

impl WatsonxClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Regional endpoint, defaults to [`DEFAULT_WATSONX_URL`]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// IAM endpoint, defaults to [`DEFAULT_IAM_URL`]
    pub fn iam_url(mut self, iam_url: impl Into<String>) -> Self {
        self.iam_url = Some(iam_url.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn build(self) -> Result<WatsonxClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Config("API key is required".to_string()))?;
        let project_id = self
            .project_id
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| LlmError::Config("Project ID is required".to_string()))?;

        let url = self
            .url
            .unwrap_or_else(|| DEFAULT_WATSONX_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let iam_url = self.iam_url.unwrap_or_else(|| DEFAULT_IAM_URL.to_string());
        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let auth = IamTokenProvider::new(http_client.clone(), iam_url, api_key);

        Ok(WatsonxClient {
            http_client,
            url,
            project_id,
            api_version,
            auth,
        })
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ChatClient for WatsonxClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, request.messages, &request.options)?;
        let token = self.auth.token().await?;

        tracing::debug!(model = %request.model, "Sending watsonx chat request");

        let response = self
            .http_client
            .post(self.chat_url())
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: "watsonx",
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body = response.text().await?;
        let raw: WatsonxChatResponse = serde_json::from_str(&body)?;

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
            model: raw.model_id,
        })
    }
}

// ============================================================================
// WATSONX-SPECIFIC RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct WatsonxChatResponse {
    #[serde(default)]
    model_id: Option<String>,
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
