//! Shared JSON-over-HTTP plumbing for the remote providers

use crate::LlmError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Build a client with a per-request timeout
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// POST `body` to `url` and decode the JSON reply
///
/// Server errors, rate limiting and transport failures are retried with
/// exponential backoff (1s, 2s, 4s, ...). Client errors fail immediately.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &B,
    model: &str,
    max_retries: u32,
) -> Result<R, LlmError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let attempts_allowed = max_retries.max(1);
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < attempts_allowed {
        let mut request = client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response.json::<R>().await.map_err(|e| {
                        LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                    });
                }

                match status {
                    StatusCode::NOT_FOUND => {
                        return Err(LlmError::ModelNotAvailable(model.to_string()));
                    }
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        return Err(LlmError::Unauthorized(format!("HTTP {}", status)));
                    }
                    StatusCode::TOO_MANY_REQUESTS => {
                        last_error = Some(LlmError::RateLimitExceeded);
                    }
                    _ => {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        let error =
                            LlmError::Communication(format!("HTTP {}: {}", status, error_text));
                        if status.is_client_error() {
                            return Err(error);
                        }
                        last_error = Some(error);
                    }
                }
            }
            Err(e) => {
                last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
            }
        }

        attempts += 1;
        if attempts < attempts_allowed {
            let delay = Duration::from_secs(2u64.pow(attempts - 1));
            warn!(
                "LLM request to {} failed (attempt {}/{}), retrying in {:?}",
                url, attempts, attempts_allowed, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    debug!("Giving up on {} after {} attempts", url, attempts);
    Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
}
