//! Category registry.
//!
//! Categories are global and immutable: registration either creates a new
//! (part, theme, period) triple or fails with `Duplicate`.

use tracing::{error, info, instrument};

use crate::auth::{require_user, UserId};
use crate::domain::Category;
use crate::error::{MyeltsError, Result};
use crate::store::Database;

use super::validation::require_field;

/// Create-or-reject registry for categories
#[derive(Clone)]
pub struct CategoryRegistry {
    db: Database,
}

impl CategoryRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a new category; an identical triple fails with `Duplicate`
    #[instrument(skip(self, user))]
    pub fn register(
        &self,
        user: Option<&UserId>,
        part: &str,
        theme: &str,
        period: &str,
    ) -> Result<Category> {
        require_user(user)?;

        let part = require_field("part", part)?;
        let theme = require_field("theme", theme)?;
        let period = require_field("period", period)?;

        let repo = self.db.categories();
        if let Some(existing) = repo.find_by_triple(part, theme, period)? {
            return Err(MyeltsError::Duplicate(existing.label()));
        }

        // The UNIQUE index still catches a concurrent insert of the same triple
        let category = Category::new(part, theme, period);
        repo.insert(&category)?;

        info!(category_id = %category.id, "Category registered");
        Ok(category)
    }

    /// Substring search across part, theme and period
    pub fn search(&self, query: &str) -> Result<Vec<Category>> {
        self.db.categories().search(query)
    }

    /// Read path for listings: failures are logged and shown as no matches
    pub fn search_or_empty(&self, query: &str) -> Vec<Category> {
        match self.search(query) {
            Ok(categories) => categories,
            Err(e) => {
                error!(query, error = %e, "Failed to search categories");
                Vec::new()
            }
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<Category>> {
        self.db.categories().get(id)
    }
}
