//! Prompt construction for candidate extraction

use retort_domain::CompletionRequest;

/// Fixed system instruction sent with every extraction call
pub const SYSTEM_PROMPT: &str = "You are a chemistry expert that extracts structured data \
from research papers. Always return valid JSON.";

const EXTRACTION_INSTRUCTIONS: &str = r#"You analyze chemistry research papers. Read the paper text below and extract:

1. Paper metadata: title, authors (array), abstract, journal, year, keywords (array)
2. Compounds mentioned: array of objects with {name, category, description, possibleSMILES, bioactivity (array)}
3. Synthesis routes: array of objects with {name, notes, steps: [{stepNumber, from, to, reagent, conditions, description}]}

Name each synthesis route after the compound it produces."#;

const OUTPUT_FORMAT: &str = r#"Return ONLY valid JSON in exactly this shape:
{
  "paper": {
    "title": "...",
    "authors": ["..."],
    "abstract": "...",
    "journal": "...",
    "year": 2024,
    "keywords": ["..."]
  },
  "compounds": [
    {
      "name": "...",
      "category": "...",
      "description": "...",
      "possibleSMILES": "...",
      "bioactivity": ["..."]
    }
  ],
  "synthesisRoutes": [
    {
      "name": "...",
      "notes": "...",
      "steps": [
        {
          "stepNumber": 1,
          "from": "...",
          "to": "...",
          "reagent": "...",
          "conditions": "...",
          "description": "..."
        }
      ]
    }
  ]
}"#;

/// Builds bounded, deterministic extraction requests
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    char_budget: usize,
    max_tokens: u32,
    temperature: f32,
}

impl PromptBuilder {
    /// Create a builder
    pub fn new(char_budget: usize, max_tokens: u32, temperature: f32) -> Self {
        Self {
            char_budget,
            max_tokens,
            temperature,
        }
    }

    /// Build the request for `text`
    pub fn build(&self, text: &str) -> CompletionRequest {
        let excerpt = truncate_chars(text, self.char_budget);

        let mut prompt = String::with_capacity(
            EXTRACTION_INSTRUCTIONS.len() + OUTPUT_FORMAT.len() + excerpt.len() + 64,
        );
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\nText to analyze:\n---\n");
        prompt.push_str(excerpt);
        prompt.push_str("\n---\n\n");
        prompt.push_str(OUTPUT_FORMAT);

        CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// The first `max_chars` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        // Each of these is multi-byte in UTF-8
        let text = "αβγδε";
        assert_eq!(truncate_chars(text, 2), "αβ");
        assert_eq!(truncate_chars("→→→", 1), "→");
    }

    #[test]
    fn test_build_respects_budget() {
        let builder = PromptBuilder::new(12_000, 4_000, 0.3);
        let text = "x".repeat(20_000);
        let request = builder.build(&text);

        assert!(request.prompt.contains(&"x".repeat(12_000)));
        assert!(!request.prompt.contains(&"x".repeat(12_001)));
        assert_eq!(request.max_tokens, 4_000);
        assert_eq!(request.system, SYSTEM_PROMPT);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new(100, 50, 0.0);
        assert_eq!(builder.build("same text"), builder.build("same text"));
    }

    #[test]
    fn test_prompt_names_schema_keys() {
        let request = PromptBuilder::new(100, 50, 0.3).build("text");
        for key in ["\"paper\"", "\"compounds\"", "\"synthesisRoutes\"", "possibleSMILES", "stepNumber"] {
            assert!(request.prompt.contains(key), "prompt should mention {}", key);
        }
    }
}
