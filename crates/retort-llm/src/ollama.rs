//! Ollama Provider Implementation
//!
//! Runs extraction against a local Ollama instance, keeping paper text on
//! the machine.
//!
//! # Examples
//!
//! ```no_run
//! use retort_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
//! ```

use crate::http::{build_client, post_json};
use crate::LlmError;
use retort_domain::{CompletionProvider, CompletionRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for a single request
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts per completion
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with an explicit per-request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client(timeout)?,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a provider against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }
}

impl CompletionProvider for OllamaProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let body = GenerateRequest {
            model: &self.model,
            system: &request.system,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: request.max_tokens,
                temperature: request.temperature,
            },
        };

        let response: GenerateResponse = post_json(
            &self.client,
            &self.generate_url(),
            None,
            &body,
            &self.model,
            self.max_retries,
        )
        .await?;

        Ok(response.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model_name(), "llama3");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(provider.generate_url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral")
            .unwrap()
            .with_max_retries(5);
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.max_retries, 5);
    }

    #[test]
    fn test_generate_request_shape() {
        let body = GenerateRequest {
            model: "llama3",
            system: "be terse",
            prompt: "hi",
            stream: false,
            options: GenerateOptions {
                num_predict: 4000,
                temperature: 0.5,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["system"], "be terse");
        assert_eq!(json["options"]["num_predict"], 4000);
        assert_eq!(json["options"]["temperature"], 0.5);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        let provider = OllamaProvider::with_timeout(
            "http://127.0.0.1:9",
            "llama3",
            Duration::from_millis(200),
        )
        .unwrap()
        .with_max_retries(1);

        let request = CompletionRequest {
            system: String::new(),
            prompt: "hello".to_string(),
            max_tokens: 8,
            temperature: 0.0,
        };
        let result = provider.complete(&request).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
