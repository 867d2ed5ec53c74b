use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::timestamp;

/// Options offered to every user before their own categories.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["Work", "Family", "Health"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name must be 1-100 characters"))]
    pub name: String,
}

/// Defaults followed by the user's own names, first occurrence wins.
pub fn category_options(categories: &[Category]) -> Vec<String> {
    let mut options: Vec<String> = Vec::with_capacity(DEFAULT_CATEGORIES.len() + categories.len());
    let names = DEFAULT_CATEGORIES
        .iter()
        .map(|name| name.to_string())
        .chain(categories.iter().map(|c| c.name.clone()));
    for name in names {
        if !options.contains(&name) {
            options.push(name);
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Category {
        Category {
            id: name.to_lowercase(),
            user_id: "u1".into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_options_start_with_defaults() {
        assert_eq!(category_options(&[]), vec!["Work", "Family", "Health"]);
    }

    #[test]
    fn test_options_merge_without_duplicates() {
        let options = category_options(&[category("Sleep"), category("Work"), category("Sleep")]);
        assert_eq!(options, vec!["Work", "Family", "Health", "Sleep"]);
    }
}
