use config::{Config as ConfigLoader, ConfigError, Environment, File};
use mindroute_graph::{LLMConfig, Topology};
use mindroute_llm::watsonx::{DEFAULT_MODEL_ID, DEFAULT_WATSONX_URL};
use mindroute_llm::{OpenAIConfig, ProviderConfig, ProviderType, WatsonxConfig};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub graph: GraphConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub watsonx_apikey: Option<String>,
    #[serde(default)]
    pub watsonx_project_id: Option<String>,
    #[serde(default)]
    pub watsonx_url: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderType,
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Endpoint override; `WATSONX_URL` still wins for watsonx
    #[serde(default)]
    pub base_url: Option<String>,
}

impl From<&LlmConfig> for LLMConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphMode {
    /// Classify, route and answer with a persona
    #[default]
    Conditional,
    /// Forward the whole history to a single chatbot node
    Sequence,
}

impl GraphMode {
    pub fn topology(self) -> Topology {
        match self {
            GraphMode::Conditional => Topology::Conditional,
            GraphMode::Sequence => Topology::Sequence,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub mode: GraphMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub prompt: String,
    pub farewell: String,
}

impl Config {
    /// Load configuration from built-in defaults, TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. built-in defaults
    /// 2. config/default.toml
    /// 3. config/{ENV}.toml (if ENV is set)
    /// 4. MINDROUTE__SECTION__KEY environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("MINDROUTE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets are read here and validated once the provider is known
        cfg.watsonx_apikey = std::env::var("WATSONX_APIKEY").ok();
        cfg.watsonx_project_id = std::env::var("WATSONX_PROJECT_ID").ok();
        cfg.watsonx_url = std::env::var("WATSONX_URL").ok();
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        Ok(cfg)
    }

    /// Load config from a specific path, on top of the built-in defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        ConfigLoader::builder()
            .set_default("llm.provider", "watsonx")?
            .set_default("llm.model", DEFAULT_MODEL_ID)?
            .set_default("graph.mode", "conditional")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("session.prompt", "Enter Message: ")?
            .set_default("session.farewell", "Bye")
    }

    pub fn llm_config(&self) -> LLMConfig {
        LLMConfig::from(&self.llm)
    }

    /// Credentials and endpoint for the selected provider.
    ///
    /// Missing secrets are a startup error, never a per-turn one.
    pub fn provider_config(&self) -> Result<ProviderConfig, ConfigError> {
        match self.llm.provider {
            ProviderType::Watsonx => {
                let api_key = required(&self.watsonx_apikey, "WATSONX_APIKEY")?;
                let project_id = required(&self.watsonx_project_id, "WATSONX_PROJECT_ID")?;
                let url = self
                    .watsonx_url
                    .clone()
                    .or_else(|| self.llm.base_url.clone())
                    .unwrap_or_else(|| DEFAULT_WATSONX_URL.to_string());

                Ok(ProviderConfig::Watsonx(
                    WatsonxConfig::new(api_key, project_id).with_url(url),
                ))
            }
            ProviderType::OpenAI => {
                let api_key = required(&self.openai_api_key, "OPENAI_API_KEY")?;
                let mut openai = OpenAIConfig::new(api_key);
                if let Some(base_url) = &self.llm.base_url {
                    openai = openai.with_base_url(base_url.clone());
                }
                Ok(ProviderConfig::OpenAI(openai))
            }
        }
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::Message(format!("{} environment variable is required", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [llm]
        provider = "watsonx"
        model = "ibm/granite-3-8b-instruct"
        temperature = 0.2
        max_tokens = 512

        [graph]
        mode = "sequence"

        [logging]
        level = "debug"
        format = "json"

        [session]
        prompt = "> "
        farewell = "Goodbye"
    "#;

    fn sample() -> Config {
        toml::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_config_structure() {
        let config = sample();
        assert_eq!(config.llm.provider, ProviderType::Watsonx);
        assert_eq!(config.graph.mode, GraphMode::Sequence);
        assert_eq!(config.graph.mode.topology(), Topology::Sequence);
        assert_eq!(config.session.farewell, "Goodbye");
        assert!(config.watsonx_apikey.is_none());

        let llm = config.llm_config();
        assert_eq!(llm.model, "ibm/granite-3-8b-instruct");
        assert_eq!(llm.temperature, Some(0.2));
        assert_eq!(llm.max_tokens, Some(512));
    }

    #[test]
    fn test_missing_watsonx_secrets_fail() {
        let mut config = sample();
        let err = config.provider_config().unwrap_err();
        assert!(err.to_string().contains("WATSONX_APIKEY"));

        config.watsonx_apikey = Some("key".to_string());
        config.watsonx_project_id = Some("   ".to_string());
        let err = config.provider_config().unwrap_err();
        assert!(err.to_string().contains("WATSONX_PROJECT_ID"));
    }

    #[test]
    fn test_watsonx_url_defaults() {
        let mut config = sample();
        config.watsonx_apikey = Some("key".to_string());
        config.watsonx_project_id = Some("project".to_string());

        match config.provider_config().unwrap() {
            ProviderConfig::Watsonx(watsonx) => {
                assert_eq!(watsonx.url, DEFAULT_WATSONX_URL);
                assert_eq!(watsonx.project_id, "project");
            }
            other => panic!("unexpected provider: {:?}", other),
        }

        config.watsonx_url = Some("https://eu-de.ml.cloud.ibm.com".to_string());
        match config.provider_config().unwrap() {
            ProviderConfig::Watsonx(watsonx) => {
                assert_eq!(watsonx.url, "https://eu-de.ml.cloud.ibm.com")
            }
            other => panic!("unexpected provider: {:?}", other),
        }
    }

    #[test]
    fn test_openai_provider() {
        let mut config = sample();
        config.llm.provider = ProviderType::OpenAI;
        config.llm.base_url = Some("http://localhost:8080/v1".to_string());
        assert!(config.provider_config().is_err());

        config.openai_api_key = Some("sk-test".to_string());
        match config.provider_config().unwrap() {
            ProviderConfig::OpenAI(openai) => {
                assert_eq!(openai.base_url.as_deref(), Some("http://localhost:8080/v1"))
            }
            other => panic!("unexpected provider: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: Config = Config::defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.llm.provider, ProviderType::Watsonx);
        assert_eq!(config.llm.model, DEFAULT_MODEL_ID);
        assert_eq!(config.graph.mode, GraphMode::Conditional);
        assert_eq!(config.session.prompt, "Enter Message: ");
        assert_eq!(config.session.farewell, "Bye");
    }
}
