//! Runtime provider selection
//!
//! `ProviderConfig` is the `[llm]` table of a service config file;
//! `build()` turns it into an `AnyProvider`.

use crate::{openai, LlmError, MockProvider, OllamaProvider, OpenAiProvider};
use retort_domain::{CompletionProvider, CompletionRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
    /// Canned response, no network
    Mock,
}

/// Provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend kind
    #[serde(default)]
    pub kind: ProviderKind,

    /// Base URL; each kind has its own default
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per completion
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Reply served by the mock provider
    #[serde(default)]
    pub mock_response: Option<String>,
}

fn default_model() -> String {
    openai::DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    openai::DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    openai::DEFAULT_MAX_RETRIES
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            endpoint: None,
            model: default_model(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            mock_response: None,
        }
    }
}

impl ProviderConfig {
    /// A mock provider config serving `response`
    pub fn mock(response: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Mock,
            model: "mock".to_string(),
            mock_response: Some(response.into()),
            ..Default::default()
        }
    }

    /// Check field values without touching the environment
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::Configuration("model cannot be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(LlmError::Configuration(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(LlmError::Configuration(
                "max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Construct the configured provider
    ///
    /// For `openai`, the API key is read from `api_key_env`.
    pub fn build(&self) -> Result<AnyProvider, LlmError> {
        self.validate()?;
        let timeout = Duration::from_secs(self.request_timeout_secs);

        let provider = match self.kind {
            ProviderKind::OpenAi => {
                let api_key = std::env::var(&self.api_key_env).map_err(|_| {
                    LlmError::Configuration(format!(
                        "environment variable {} is not set",
                        self.api_key_env
                    ))
                })?;
                let endpoint = self.endpoint.as_deref().unwrap_or(openai::DEFAULT_ENDPOINT);
                AnyProvider::OpenAi(
                    OpenAiProvider::with_endpoint(endpoint, api_key, &self.model, timeout)?
                        .with_max_retries(self.max_retries),
                )
            }
            ProviderKind::Ollama => {
                let endpoint = self
                    .endpoint
                    .as_deref()
                    .unwrap_or(crate::ollama::DEFAULT_ENDPOINT);
                AnyProvider::Ollama(
                    OllamaProvider::with_timeout(endpoint, &self.model, timeout)?
                        .with_max_retries(self.max_retries),
                )
            }
            ProviderKind::Mock => AnyProvider::Mock(MockProvider::new(
                self.mock_response.clone().unwrap_or_else(|| "{}".to_string()),
            )),
        };

        info!("Using {:?} provider with model {}", self.kind, provider.model_name());
        Ok(provider)
    }
}

/// A provider chosen at runtime
pub enum AnyProvider {
    /// OpenAI-compatible backend
    OpenAi(OpenAiProvider),
    /// Ollama backend
    Ollama(OllamaProvider),
    /// Mock backend
    Mock(MockProvider),
}

impl From<MockProvider> for AnyProvider {
    fn from(provider: MockProvider) -> Self {
        AnyProvider::Mock(provider)
    }
}

impl CompletionProvider for AnyProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        match self {
            AnyProvider::OpenAi(p) => p.complete(request).await,
            AnyProvider::Ollama(p) => p.complete(request).await,
            AnyProvider::Mock(p) => p.complete(request).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            AnyProvider::OpenAi(p) => p.model_name(),
            AnyProvider::Ollama(p) => p.model_name(),
            AnyProvider::Mock(p) => p.model_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_table() {
        let config: ProviderConfig = toml::from_str("").unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.kind, ProviderKind::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_parse_ollama_table() {
        let config: ProviderConfig = toml::from_str(
            r#"
            kind = "ollama"
            endpoint = "http://gpu-box:11434"
            model = "llama3"
            max_retries = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.kind, ProviderKind::Ollama);

        let provider = config.build().unwrap();
        assert!(matches!(provider, AnyProvider::Ollama(_)));
        assert_eq!(provider.model_name(), "llama3");
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let config = ProviderConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_openai_requires_key_variable() {
        let config = ProviderConfig {
            api_key_env: "RETORT_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.build(), Err(LlmError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_mock_kind_serves_configured_response() {
        let provider = ProviderConfig::mock(r#"{"paper":{"title":"T"}}"#)
            .build()
            .unwrap();
        let request = CompletionRequest {
            system: String::new(),
            prompt: "anything".to_string(),
            max_tokens: 10,
            temperature: 0.0,
        };
        assert_eq!(
            provider.complete(&request).await.unwrap(),
            r#"{"paper":{"title":"T"}}"#
        );
        assert_eq!(provider.model_name(), "mock");
    }
}
