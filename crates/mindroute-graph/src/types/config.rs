use mindroute_llm::watsonx::DEFAULT_MODEL_ID;
use mindroute_llm::ChatOptions;
use serde::{Deserialize, Serialize};

/// Model settings shared by every node that calls the model client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn chat_options(&self) -> ChatOptions {
        let mut options = ChatOptions::new();
        if let Some(temp) = self.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = self.max_tokens {
            options = options.max_tokens(max_tokens);
        }
        options
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_ID)
    }
}
