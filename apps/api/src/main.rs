mod completion;
mod config;
mod db;
mod errors;
mod matching;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::completion::anthropic::AnthropicProvider;
use crate::completion::{NullProvider, TextCompletionProvider};
use crate::config::Config;
use crate::db::create_pool;
use crate::matching::scorer::{GenerativeMatchScorer, LexicalMatchScorer, MatchScorer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    let default_filter = format!(
        "{}={}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        &config.rust_log
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting TriPlace Matching API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize PostgreSQL (user/community read models)
    let db = create_pool(&config.database_url).await?;

    // Completion provider: Anthropic when a key is configured, null otherwise.
    // The null wiring keeps every endpoint functional on the fallback paths.
    let completion: Arc<dyn TextCompletionProvider> = match &config.anthropic_api_key {
        Some(api_key) => {
            info!(
                "Completion provider initialized (model: {})",
                completion::anthropic::MODEL
            );
            Arc::new(AnthropicProvider::new(api_key.clone()))
        }
        None => {
            info!("No completion provider configured — deterministic fallbacks only");
            Arc::new(NullProvider)
        }
    };

    // Scorer follows the provider: generative (with lexical degradation) when
    // available, pure lexical otherwise
    let scorer: Arc<dyn MatchScorer> = if completion.is_available() {
        Arc::new(GenerativeMatchScorer::new(completion.clone()))
    } else {
        Arc::new(LexicalMatchScorer)
    };

    // Build app state
    let state = AppState {
        db,
        completion,
        scorer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
