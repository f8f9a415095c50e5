#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User read model. Owned by the external auth/persistence layer — this
/// service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Identity from the external auth provider.
    pub external_id: String,
    pub display_name: String,
    /// Free-text interests, ordered, not necessarily unique.
    pub interests: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Structured onboarding quiz answers: category → list of answers.
    pub quiz_answers: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The interest pool used for matching: free-text interests merged with
    /// quiz answer values, de-duplicated case-insensitively, order preserved.
    pub fn interest_pool(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut pool = Vec::new();

        let quiz_values = self
            .quiz_answers
            .as_ref()
            .and_then(|v| v.as_object())
            .map(|obj| {
                obj.values()
                    .filter_map(|v| v.as_array())
                    .flatten()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        for interest in self.interests.iter().cloned().chain(quiz_values) {
            let trimmed = interest.trim().to_string();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(trimmed.to_lowercase()) {
                pool.push(trimmed);
            }
        }

        pool
    }
}
