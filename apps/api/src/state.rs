use std::sync::Arc;

use sqlx::PgPool;

use crate::completion::TextCompletionProvider;
use crate::config::Config;
use crate::matching::scorer::MatchScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Completion capability: Anthropic-backed when an API key is configured,
    /// the null provider otherwise. Callers fall back deterministically.
    pub completion: Arc<dyn TextCompletionProvider>,
    /// Pluggable scorer. Lexical by default; generative when a provider is
    /// available.
    pub scorer: Arc<dyn MatchScorer>,
    pub config: Config,
}
