//! Text completion capability — the single point of entry for generative
//! calls in the matching service.
//!
//! ARCHITECTURAL RULE: no module may talk to a completion API directly.
//! Everything goes through `TextCompletionProvider`, injected at startup as
//! `Arc<dyn TextCompletionProvider>`: the Anthropic-backed implementation
//! when an API key is configured, the null implementation otherwise. Matching
//! callers treat every `CompletionError` as "service absent" and take their
//! deterministic fallback path — no completion error leaves this subsystem.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod anthropic;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("No completion provider configured")]
    Unavailable,
}

/// Capability interface over an external generative-text service.
///
/// Implementations must be safe to share across request handlers; they are
/// injected at construction time rather than reached through any global
/// client singleton.
#[async_trait]
pub trait TextCompletionProvider: Send + Sync {
    /// Short provider label for logs.
    fn name(&self) -> &'static str;

    /// Whether the provider is configured and expected to be reachable.
    fn is_available(&self) -> bool;

    /// Runs a single completion and returns the raw text reply.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, CompletionError>;
}

/// Null object injected when no API key is configured. Every call fails with
/// `Unavailable`, which callers map to their deterministic fallback.
pub struct NullProvider;

#[async_trait]
impl TextCompletionProvider for NullProvider {
    fn name(&self) -> &'static str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Unavailable)
    }
}

/// Runs a completion and deserializes the reply as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn complete_json<T: DeserializeOwned>(
    provider: &dyn TextCompletionProvider,
    prompt: &str,
    system: &str,
) -> Result<T, CompletionError> {
    let text = provider.complete(prompt, system).await?;

    // Strip markdown code fences if the model wraps JSON in them
    let text = strip_json_fences(&text);

    serde_json::from_str(text).map_err(CompletionError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
