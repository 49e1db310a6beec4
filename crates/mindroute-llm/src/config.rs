// Configuration layer for provider-agnostic chat client creation

use crate::error::Result;
use crate::traits::ChatClient;
use crate::watsonx::{DEFAULT_API_VERSION, DEFAULT_IAM_URL, DEFAULT_WATSONX_URL};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Type of LLM provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    Watsonx,
    OpenAI,
}

/// Configuration for IBM watsonx.ai
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatsonxConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default = "default_watsonx_url")]
    pub url: String,
    #[serde(default = "default_iam_url")]
    pub iam_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_watsonx_url() -> String {
    DEFAULT_WATSONX_URL.to_string()
}

fn default_iam_url() -> String {
    DEFAULT_IAM_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl WatsonxConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            url: default_watsonx_url(),
            iam_url: default_iam_url(),
            api_version: default_api_version(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_iam_url(mut self, iam_url: impl Into<String>) -> Self {
        self.iam_url = iam_url.into();
        self
    }
}

/// Configuration for OpenAI (or an OpenAI-compatible server)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Base URL for the API (optional, defaults to https://api.openai.com/v1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Complete provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Watsonx(WatsonxConfig),
    OpenAI(OpenAIConfig),
}

impl ProviderConfig {
    pub fn watsonx(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self::Watsonx(WatsonxConfig::new(api_key, project_id))
    }

    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAI(OpenAIConfig::new(api_key))
    }

    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::Watsonx(_) => ProviderType::Watsonx,
            Self::OpenAI(_) => ProviderType::OpenAI,
        }
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_client(config: ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        match config {
            ProviderConfig::Watsonx(watsonx) => {
                let client = crate::watsonx::WatsonxClient::builder()
                    .api_key(watsonx.api_key)
                    .project_id(watsonx.project_id)
                    .url(watsonx.url)
                    .iam_url(watsonx.iam_url)
                    .api_version(watsonx.api_version)
                    .build()?;
                Ok(Arc::new(client))
            }
            ProviderConfig::OpenAI(openai) => {
                let mut client = crate::openai::OpenAIClient::new(openai.api_key)?;
                if let Some(base_url) = openai.base_url {
                    client = client.with_base_url(base_url);
                }
                Ok(Arc::new(client))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watsonx_config_defaults() {
        let config = WatsonxConfig::new("key", "proj");
        assert_eq!(config.url, "https://us-south.ml.cloud.ibm.com");
        assert_eq!(config.iam_url, "https://iam.cloud.ibm.com");
        assert_eq!(config.api_version, "2023-05-29");
    }

    #[test]
    fn test_provider_type() {
        assert_eq!(ProviderConfig::watsonx("k", "p").provider_type(), ProviderType::Watsonx);
        assert_eq!(ProviderConfig::openai("k").provider_type(), ProviderType::OpenAI);
    }

    #[test]
    fn test_deserialize_watsonx_fills_defaults() {
        let json = r#"{"type":"watsonx","api_key":"k","project_id":"p"}"#;
        let config: ProviderConfig = serde_json::from_str(json).unwrap();
        match config {
            ProviderConfig::Watsonx(w) => assert_eq!(w.url, DEFAULT_WATSONX_URL),
            other => panic!("Expected watsonx config, got {:?}", other),
        }
    }

    #[test]
    fn test_factory_rejects_blank_watsonx_key() {
        let result = ClientFactory::create_client(ProviderConfig::watsonx("", "proj"));
        assert!(result.is_err());
    }

    #[test]
    fn test_factory_builds_openai_client() {
        let config = ProviderConfig::OpenAI(OpenAIConfig::new("k").with_base_url("http://localhost:8000/v1"));
        assert!(ClientFactory::create_client(config).is_ok());
    }
}
