//! Categories group cards by exam part, theme and period.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (part, theme, period) classification tag shared by all users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Exam part, e.g. "Part 2"
    pub part: String,

    /// Topic, e.g. "Describe a place"
    pub theme: String,

    /// Question-bank period, e.g. "2024-Q1"
    pub period: String,

    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category with a fresh identifier
    pub fn new(part: impl Into<String>, theme: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            part: part.into(),
            theme: theme.into(),
            period: period.into(),
            created_at: Utc::now(),
        }
    }

    /// Display label used by pickers and listings
    pub fn label(&self) -> String {
        format_category(&self.part, &self.theme, &self.period)
    }
}

/// Render a category triple as "part - theme - period"
pub fn format_category(part: &str, theme: &str, period: &str) -> String {
    format!("{} - {} - {}", part, theme, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        let category = Category::new("Part 2", "Describe a place", "2024-Q1");
        assert_eq!(category.label(), "Part 2 - Describe a place - 2024-Q1");
    }

    #[test]
    fn test_new_categories_get_distinct_ids() {
        let a = Category::new("Part 1", "Hometown", "2024-Q1");
        let b = Category::new("Part 1", "Hometown", "2024-Q1");
        assert_ne!(a.id, b.id);
    }
}
