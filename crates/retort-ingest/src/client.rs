//! AI extraction client
//!
//! Sends the prompt, applies the deadline, and recovers every failure into
//! the empty skeleton.

use crate::error::AiError;
use crate::normalize::Normalizer;
use crate::parser::parse_ai_response;
use crate::prompt::PromptBuilder;
use crate::types::CandidateBundle;
use retort_domain::CompletionProvider;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Candidates produced for one document
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Normalized candidates
    pub bundle: CandidateBundle,
    /// Set when `bundle` is the skeleton because extraction failed
    pub warning: Option<String>,
}

/// Calls the model and decodes its answer
pub struct ExtractionClient<L> {
    provider: Arc<L>,
    prompts: PromptBuilder,
    deadline: Duration,
}

impl<L> ExtractionClient<L>
where
    L: CompletionProvider + Send + Sync,
{
    /// Create a client
    pub fn new(provider: L, prompts: PromptBuilder, deadline: Duration) -> Self {
        Self {
            provider: Arc::new(provider),
            prompts,
            deadline,
        }
    }

    /// Model requests are sent to
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Ask the model for raw candidate JSON
    pub async fn request_candidates(&self, text: &str) -> Result<Value, AiError> {
        let request = self.prompts.build(text);
        debug!("Prompt length: {} chars", request.prompt.chars().count());

        let reply = timeout(self.deadline, self.provider.complete(&request))
            .await
            .map_err(|_| AiError::Timeout(self.deadline))?
            .map_err(|e| AiError::Service(e.to_string()))?;

        debug!("Model reply length: {} chars", reply.chars().count());
        parse_ai_response(&reply)
    }

    /// Extract normalized candidates, falling back to the skeleton
    pub async fn extract(&self, text: &str, normalizer: &Normalizer) -> Extraction {
        match self.request_candidates(text).await {
            Ok(raw) => {
                let bundle = normalizer.normalize(&raw);
                info!(
                    "Extracted {} compound and {} route candidates with {}",
                    bundle.compounds.len(),
                    bundle.synthesis_routes.len(),
                    self.model_name()
                );
                Extraction {
                    bundle,
                    warning: None,
                }
            }
            Err(e) => {
                warn!("Extraction fell back to empty candidates: {}", e);
                Extraction {
                    bundle: normalizer.skeleton(),
                    warning: Some(e.to_string()),
                }
            }
        }
    }
}
