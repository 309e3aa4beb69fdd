/// LLM Client: the single point of entry for all completion calls in Condenser.
///
/// ARCHITECTURAL RULE: the engines (`summarize`, `reasoning`) never talk to the Anthropic
/// API directly. They depend on the `TextCompletion` trait; `LlmClient` is the production
/// implementation and the only code that knows about HTTP.
///
/// Model: claude-sonnet-4-5 (hardcoded: do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[cfg(test)]
pub mod testing;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in Condenser.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
/// Transport-level ceiling. Per-call deadlines are enforced above this by `enforce_deadline`.
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

// ────────────────────────────────────────────────────────────────────────────
// Completion service contract
// ────────────────────────────────────────────────────────────────────────────

/// Failure of a single completion call, as seen by the engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("completion service error: {0}")]
    Service(String),
}

/// An opaque text-completion service: prompt in, text out.
///
/// Carried in `AppState` as `Arc<dyn TextCompletion>` so the engines can be driven by a
/// scripted implementation in tests.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        deadline: Option<Duration>,
    ) -> Result<String, CompletionError>;
}

/// Runs `fut` under an optional deadline. Expiry maps to `CompletionError::Timeout`.
pub async fn enforce_deadline<F>(
    deadline: Option<Duration>,
    fut: F,
) -> Result<String, CompletionError>
where
    F: std::future::Future<Output = Result<String, CompletionError>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| CompletionError::Timeout(limit))?,
        None => fut.await,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl From<LlmError> for CompletionError {
    fn from(err: LlmError) -> Self {
        CompletionError::Service(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Concatenates every text block in order. Empty when the model produced no text.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The production completion client.
/// Wraps the Anthropic Messages API with retry logic on 429 and 5xx.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            api_key,
        })
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = backoff_delay(attempt);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextCompletion for LlmClient {
    async fn complete(
        &self,
        prompt: &str,
        deadline: Option<Duration>,
    ) -> Result<String, CompletionError> {
        enforce_deadline(deadline, async {
            let response = self.call(prompt, prompts::ANALYST_SYSTEM).await?;
            let text = response.text();
            if text.trim().is_empty() {
                return Err(LlmError::EmptyContent.into());
            }
            Ok(text)
        })
        .await
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << (attempt - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: &str, text: Option<&str>) -> ContentBlock {
        ContentBlock {
            block_type: kind.to_string(),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_response_text_joins_text_blocks_only() {
        let response = LlmResponse {
            content: vec![
                block("text", Some("first ")),
                block("tool_use", None),
                block("text", Some("second")),
            ],
            usage: Usage {
                input_tokens: 10,
                output_tokens: 2,
            },
        };
        assert_eq!(response.text(), "first second");
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn test_llm_error_maps_to_service_error() {
        let err: CompletionError = LlmError::EmptyContent.into();
        assert_eq!(
            err,
            CompletionError::Service("LLM returned empty content".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_enforce_deadline_times_out() {
        let result = enforce_deadline(Some(Duration::from_secs(5)), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("late".to_string())
        })
        .await;
        assert_eq!(result, Err(CompletionError::Timeout(Duration::from_secs(5))));
    }

    #[tokio::test]
    async fn test_enforce_deadline_without_limit_passes_through() {
        let result = enforce_deadline(None, async { Ok("done".to_string()) }).await;
        assert_eq!(result.as_deref(), Ok("done"));
    }
}
