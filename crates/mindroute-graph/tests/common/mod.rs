#![allow(dead_code)]

use async_trait::async_trait;
use mindroute_llm::{ChatClient, ChatRequest, ChatResponse, LlmError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Model client double that replays scripted replies in order and records
/// every request it receives
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(ChatResponse::from_text(text)));
        self
    }

    pub fn fail(self, error: LlmError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))
    }
}

pub fn transport_failure() -> LlmError {
    LlmError::Api {
        provider: "watsonx",
        status: 503,
        body: "service unavailable".to_string(),
    }
}
