use thiserror::Error;

/// Every failure that can come out of a chat model client.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Structured output did not match schema: {0}")]
    StructuredOutput(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;
