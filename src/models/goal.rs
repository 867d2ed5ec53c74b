use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::timestamp;

pub const DEFAULT_TARGET_MOOD: i32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_mood: i32,
    /// Percentage in `[0, 100]`, written only by the progress calculator.
    #[serde(default)]
    pub progress: f64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Goal title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Target mood must be between 1 and 10"))]
    pub target_mood: Option<i32>,
}

/// Result of one progress recomputation pass.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSync {
    pub goals: Vec<Goal>,
    /// Goals whose progress write failed; they keep their previous value.
    pub failed: Vec<String>,
}
