pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route(
            "/api/v1/communities/generate",
            post(handlers::handle_generate_communities),
        )
        .route(
            "/api/v1/users/:id/recommendations",
            get(handlers::handle_get_recommendations),
        )
        .with_state(state)
}
