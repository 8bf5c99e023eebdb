//! Recover a JSON object from raw model output

use crate::error::AiError;
use serde_json::Value;

/// Parse the model's reply into a JSON object
///
/// The whole trimmed reply is tried first. Failing that, the slice from the
/// first `{` to the last `}` is tried, which strips prose and markdown
/// fences around the payload.
pub fn parse_ai_response(response: &str) -> Result<Value, AiError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(AiError::Malformed("empty response".to_string()));
    }

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(_) => parse_braced_slice(trimmed)?,
    };

    if !value.is_object() {
        return Err(AiError::Malformed("expected a JSON object".to_string()));
    }
    Ok(value)
}

fn parse_braced_slice(text: &str) -> Result<Value, AiError> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(AiError::Malformed("no JSON object found".to_string())),
    };

    serde_json::from_str(&text[start..=end])
        .map_err(|e| AiError::Malformed(format!("JSON parse error: {}", e)))
}
