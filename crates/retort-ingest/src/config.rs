//! Configuration for the ingestion pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for parse and commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Largest accepted upload (bytes)
    pub max_upload_bytes: usize,

    /// Characters of extracted text sent to the model
    pub prompt_char_budget: usize,

    /// Characters of extracted text echoed back to the reviewer
    pub preview_chars: usize,

    /// Output token cap for the extraction call
    pub max_output_tokens: u32,

    /// Sampling temperature for the extraction call
    pub temperature: f32,

    /// Deadline for the extraction call (seconds)
    pub ai_timeout_secs: u64,

    /// Category given to compounds that arrive without one
    pub default_category: String,

    /// Notes given to routes that arrive without any
    pub default_route_notes: String,
}

impl IngestConfig {
    /// Get the extraction deadline as a Duration
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }
        if self.prompt_char_budget == 0 {
            return Err("prompt_char_budget must be greater than 0".to_string());
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        if self.ai_timeout_secs == 0 {
            return Err("ai_timeout_secs must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            prompt_char_budget: 12_000,
            preview_chars: 2_000,
            max_output_tokens: 4_000,
            temperature: 0.3,
            ai_timeout_secs: 90,
            default_category: "Heterocycle".to_string(),
            default_route_notes: "Extracted from uploaded paper".to_string(),
        }
    }
}
