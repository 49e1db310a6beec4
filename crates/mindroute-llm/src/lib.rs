pub mod types;
pub mod traits;
pub mod structured;
pub mod error;
pub mod config;
pub mod watsonx;
pub mod openai;

pub use traits::{
    ChatClient,
    ChatClientExt,
    ChatRequest, ChatResponse, ChatOptions,
    TokenUsage,
};

pub use error::{LlmError, Result};
pub use structured::{ResponseFormat, parse_structured};
pub use config::{ClientFactory, ProviderConfig, ProviderType, WatsonxConfig, OpenAIConfig};
pub use watsonx::WatsonxClient;
pub use openai::OpenAIClient;
pub use types::{Message, Role};
