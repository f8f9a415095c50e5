//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::generator::{generate_communities, CommunityProposal};
use crate::matching::scorer::Recommendation;
use crate::models::community::Community;
use crate::models::user::User;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateCommunitiesRequest {
    /// Location label already resolved by the caller (reverse geocoding lives
    /// with the caller). Absent → proposals are tagged "Virtual".
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateCommunitiesResponse {
    pub proposals: Vec<CommunityProposal>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/communities/generate
///
/// Refresh-cycle entry point: loads the user population and returns a fresh
/// proposal catalog. Persisting accepted proposals is the caller's
/// responsibility — this service never writes community records.
pub async fn handle_generate_communities(
    State(state): State<AppState>,
    Json(request): Json<GenerateCommunitiesRequest>,
) -> Result<Json<GenerateCommunitiesResponse>, AppError> {
    if let Some(location) = &request.location {
        if location.trim().is_empty() {
            return Err(AppError::Validation(
                "location cannot be blank when present".to_string(),
            ));
        }
    }

    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;

    let proposals = generate_communities(
        state.completion.as_ref(),
        &users,
        request.location.as_deref(),
    )
    .await;

    Ok(Json(GenerateCommunitiesResponse { proposals }))
}

/// GET /api/v1/users/:id/recommendations
///
/// Personalized ranked community list for one user. Communities below the
/// match gate are omitted entirely.
pub async fn handle_get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let communities =
        sqlx::query_as::<_, Community>("SELECT * FROM communities ORDER BY member_count DESC")
            .fetch_all(&state.db)
            .await?;

    let recommendations = state.scorer.score(&user, &communities).await;

    Ok(Json(RecommendationsResponse { recommendations }))
}
