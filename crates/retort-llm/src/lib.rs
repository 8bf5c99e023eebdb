//! Retort LLM Provider Layer
//!
//! Pluggable completion providers for the extraction step.
//!
//! # Architecture
//!
//! This crate provides implementations of the `CompletionProvider` trait from
//! `retort-domain`. It supports multiple LLM backends with a common interface.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//! - `OllamaProvider`: Local Ollama API integration
//! - `AnyProvider`: runtime-selected provider built from `ProviderConfig`
//!
//! # Examples
//!
//! ```
//! use retort_llm::MockProvider;
//! use retort_domain::{CompletionProvider, CompletionRequest};
//!
//! # async fn example() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let request = CompletionRequest {
//!     system: String::new(),
//!     prompt: "test prompt".to_string(),
//!     max_tokens: 16,
//!     temperature: 0.0,
//! };
//! let result = provider.complete(&request).await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

mod http;
pub mod ollama;
pub mod openai;
pub mod provider;

use retort_domain::{CompletionProvider, CompletionRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{AnyProvider, ProviderConfig, ProviderKind};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Credentials rejected or missing
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Provider could not be configured
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Responses can be keyed by exact prompt, the provider can be made to
/// fail every call, and an artificial delay can be added to exercise
/// timeouts.
///
/// # Examples
///
/// ```
/// use retort_llm::MockProvider;
///
/// let provider = MockProvider::new(r#"{"paper": {}}"#);
/// assert_eq!(provider.call_count(), 0);
///
/// let failing = MockProvider::failing("connection refused");
/// assert_eq!(failing.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            failure: None,
            delay: None,
        }
    }

    /// Create a provider whose every call fails with a communication error
    pub fn failing(message: impl Into<String>) -> Self {
        let mut provider = Self::default();
        provider.failure = Some(message.into());
        provider
    }

    /// Sleep for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(prompt.into(), response.into());
        }
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.add_response(prompt, "ERROR");
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.call_count.lock().map(|c| *c).unwrap_or(0)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        if let Ok(mut count) = self.call_count.lock() {
            *count = 0;
        }
    }

    /// The most recent request received, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }

    fn respond(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if let Ok(mut count) = self.call_count.lock() {
            *count += 1;
        }
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if let Some(message) = &self.failure {
            return Err(LlmError::Communication(message.clone()));
        }

        let responses = self
            .responses
            .lock()
            .map_err(|e| LlmError::Other(format!("mock lock poisoned: {}", e)))?;
        if let Some(response) = responses.get(&request.prompt) {
            if response == "ERROR" {
                return Err(LlmError::Other("Mock error".to_string()));
            }
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl CompletionProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.respond(request)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            system: "system".to_string(),
            prompt: prompt.to_string(),
            max_tokens: 100,
            temperature: 0.3,
        }
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&request("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete(&request("hello")).await.unwrap(), "world");
        assert_eq!(provider.complete(&request("foo")).await.unwrap(), "bar");
        assert_eq!(
            provider.complete(&request("unknown")).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete(&request("prompt1")).await.unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.complete(&request("prompt2")).await.unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.complete(&request("bad prompt")).await;
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_failing() {
        let provider = MockProvider::failing("connection refused");
        let result = provider.complete(&request("anything")).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_records_last_request() {
        let provider = MockProvider::new("ok");
        assert!(provider.last_request().is_none());

        provider.complete(&request("remember me")).await.unwrap();
        let last = provider.last_request().unwrap();
        assert_eq!(last.prompt, "remember me");
        assert_eq!(last.max_tokens, 100);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request("test")).await.unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
