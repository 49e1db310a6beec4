use crate::error::{LlmError, Result};
use crate::structured::{parse_structured, ResponseFormat};
use crate::types::Message;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Trait for chat-based LLM interactions
///
/// One request in, one assistant reply out. Implementations must map every
/// failure (transport, auth, status, decoding) to [`LlmError`].
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Non-streaming chat completion
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Structured output on top of any [`ChatClient`]
#[async_trait]
pub trait ChatClientExt: ChatClient {
    /// Ask for a reply constrained to `format` and decode it into `T`
    async fn chat_structured<T>(&self, request: ChatRequest, format: ResponseFormat) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let request = request.with_response_format(format);
        let response = self.chat(request).await?;
        parse_structured(response.text()?)
    }
}

impl<C: ChatClient + ?Sized> ChatClientExt for C {}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.options.response_format = Some(format);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub response_format: Option<ResponseFormat>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
    pub model: Option<String>,
}

impl ChatResponse {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Reply text, or [`LlmError::EmptyResponse`] when the model produced nothing
    pub fn text(&self) -> Result<&str> {
        match self.content.as_deref() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(LlmError::EmptyResponse),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}
