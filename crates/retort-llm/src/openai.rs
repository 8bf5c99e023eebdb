//! OpenAI-compatible chat completions provider
//!
//! Works against api.openai.com and any server exposing the same
//! `/chat/completions` surface.

use crate::http::{build_client, post_json};
use crate::LlmError;
use retort_domain::{CompletionProvider, CompletionRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for a single request
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per completion
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Chat completions client
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider for `model` using `api_key`
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_endpoint(
            DEFAULT_ENDPOINT,
            api_key,
            model,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider against a custom base URL
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client: build_client(timeout)?,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &request.system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("response has no message content".to_string()))
}

impl CompletionProvider for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let body = self.build_body(request);
        let response: ChatResponse = post_json(
            &self.client,
            &self.completions_url(),
            Some(&self.api_key),
            &body,
            &self.model,
            self.max_retries,
        )
        .await?;

        first_choice_text(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(system: &str) -> CompletionRequest {
        CompletionRequest {
            system: system.to_string(),
            prompt: "Extract this".to_string(),
            max_tokens: 4000,
            temperature: 0.3,
        }
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = OpenAiProvider::new("  ", DEFAULT_MODEL);
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_completions_url() {
        let provider = OpenAiProvider::with_endpoint(
            "http://localhost:8080/v1/",
            "sk-test",
            "local-model",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(provider.model_name(), "local-model");
    }

    #[test]
    fn test_body_carries_system_and_user_messages() {
        let provider = OpenAiProvider::new("sk-test", DEFAULT_MODEL).unwrap();
        let req = request("You are a chemistry expert.");
        let json = serde_json::to_value(provider.build_body(&req)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Extract this");
    }

    #[test]
    fn test_body_omits_blank_system_message() {
        let provider = OpenAiProvider::new("sk-test", DEFAULT_MODEL).unwrap();
        let req = request("");
        let json = serde_json::to_value(provider.build_body(&req)).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_first_choice_text() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"paper\":{}}"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_text(response).unwrap(), r#"{"paper":{}}"#);

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_choice_text(empty),
            Err(LlmError::InvalidResponse(_))
        ));
    }
}
