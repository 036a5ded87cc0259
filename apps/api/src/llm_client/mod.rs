/// LLM Client: the single point of entry for all model calls.
///
/// ARCHITECTURAL RULE: No other module may talk to the model provider directly.
/// Phases hand a prompt and a `ResponseSchema` to `ModelClient::call_structured`
/// and get back either the typed value or one of the closed `LlmError` outcomes.
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub mod backoff;
pub mod gemini;
pub mod prompts;
pub mod rate_limit;

use backoff::BackoffPolicy;
use prompts::{reinforce_contract, JSON_ONLY_SYSTEM};
use rate_limit::RateLimiter;

/// Outcome of a structured call that did not produce a value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LlmError {
    /// The response could not be parsed against the expected shape, even
    /// after one retry with the contract restated.
    #[error("Malformed {schema} output: {detail}")]
    MalformedOutput { schema: &'static str, detail: String },

    /// Outage, auth failure, or rate limiting that outlasted every retry.
    #[error("Provider failure: {0}")]
    Provider(String),
}

/// Raw failure reported by a transport. Only `RateLimited` is retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("{0}")]
    Provider(String),
}

/// Fixed sampling configuration sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// Named JSON contract a phase expects back. `contract` is the literal
/// shape restated in prompts, since the provider does not enforce schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub contract: &'static str,
}

/// Sends one prompt to a hosted model and returns the raw response text.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<String, TransportError>;
}

/// The model client shared by every run in the process.
/// Cloning is cheap; clones share the transport and the rate limiter.
#[derive(Clone)]
pub struct ModelClient {
    transport: Arc<dyn ModelTransport>,
    limiter: Arc<RateLimiter>,
    backoff: BackoffPolicy,
    settings: GenerationSettings,
}

impl ModelClient {
    pub fn new(
        transport: Arc<dyn ModelTransport>,
        limiter: Arc<RateLimiter>,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            transport,
            limiter,
            backoff,
            settings: GenerationSettings::default(),
        }
    }

    /// Sends `prompt` and deserializes the reply as `T`.
    ///
    /// A reply that does not parse is retried once with the JSON contract
    /// restated; a second bad reply becomes `LlmError::MalformedOutput`.
    pub async fn call_structured<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<T, LlmError> {
        let text = self.call_with_backoff(prompt).await?;
        let first_error = match parse_structured::<T>(&text) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        warn!(
            "Malformed {} output ({first_error}), retrying once with the contract restated",
            schema.name
        );
        let reinforced = reinforce_contract(prompt, schema, &first_error);
        let text = self.call_with_backoff(&reinforced).await?;

        parse_structured::<T>(&text).map_err(|detail| LlmError::MalformedOutput {
            schema: schema.name,
            detail,
        })
    }

    /// One logical call: rate-limit admission plus exponential backoff on
    /// provider rate-limit signals. Other failures are returned immediately.
    async fn call_with_backoff(&self, prompt: &str) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.limiter.acquire().await;

            match self
                .transport
                .generate(JSON_ONLY_SYSTEM, prompt, &self.settings)
                .await
            {
                Ok(text) => {
                    debug!("Model call succeeded on attempt {attempt}");
                    return Ok(text);
                }
                Err(TransportError::RateLimited(message)) => {
                    if !self.backoff.should_retry(attempt) {
                        return Err(LlmError::Provider(format!(
                            "Rate limited after {attempt} attempts: {message}"
                        )));
                    }
                    let delay = self.backoff.delay_for(attempt);
                    warn!(
                        "Model call attempt {}/{} rate limited, retrying after {}ms...",
                        attempt,
                        self.backoff.max_attempts,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(TransportError::Provider(message)) => {
                    return Err(LlmError::Provider(message));
                }
            }
        }
    }
}

/// Parses model output, tolerating code fences and prose around the JSON.
fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let stripped = strip_json_fences(text);
    if stripped.is_empty() {
        return Err("empty response".to_string());
    }
    match serde_json::from_str(stripped) {
        Ok(value) => Ok(value),
        Err(first) => match extract_json_object(stripped) {
            Some(candidate) if candidate.len() < stripped.len() => {
                serde_json::from_str(candidate).map_err(|e| e.to_string())
            }
            _ => Err(first.to_string()),
        },
    }
}

/// Unwraps a reply that is entirely a ```json (or bare ```) code block.
/// A missing closing fence is tolerated.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let body = body.trim_start();
    body.strip_suffix("```").map_or(body, str::trim)
}

/// The outermost `{ ... }` span, for replies with a sentence before or after.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
