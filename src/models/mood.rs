use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::timestamp;

/// Category given to entries saved without one.
pub const DEFAULT_MOOD_CATEGORY: &str = "General";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    #[serde(rename = "mood")]
    pub mood_level: i32,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_MOOD_CATEGORY.to_string()
}

/// Blank categories fall back to [`DEFAULT_MOOD_CATEGORY`].
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default_category(),
    }
}

pub fn normalize_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodRequest {
    #[validate(range(min = 1, max = 10, message = "Mood must be between 1 and 10"))]
    pub mood: i32,
    pub category: Option<String>,
    pub note: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Edit of an existing entry. Absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMoodRequest {
    #[validate(range(min = 1, max = 10, message = "Mood must be between 1 and 10"))]
    pub mood: Option<i32>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl UpdateMoodRequest {
    pub fn is_empty(&self) -> bool {
        self.mood.is_none()
            && self.category.is_none()
            && self.note.is_none()
            && self.timestamp.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<i32>,
}
