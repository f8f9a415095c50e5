#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Community read model. Created by an administrator, a seed process, or a
/// persisted generator proposal — this service only scores against it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Community {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Single category label, e.g. "wellness" or "technology".
    pub category: String,
    pub member_count: i32,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}
