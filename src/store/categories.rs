//! Category table operations.

use rusqlite::{params, OptionalExtension, Row};

use crate::domain::Category;
use crate::error::{MyeltsError, Result};

use super::{parse_timestamp, Database};

const COLUMNS: &str = "id, part, theme, period, created_at";

/// Category persistence
#[derive(Clone)]
pub struct CategoryRepository {
    db: Database,
}

impl CategoryRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
        let created_at: String = row.get(4)?;
        Ok(Category {
            id: row.get(0)?,
            part: row.get(1)?,
            theme: row.get(2)?,
            period: row.get(3)?,
            created_at: parse_timestamp(4, &created_at)?,
        })
    }

    /// Get a category by ID
    pub fn get(&self, id: &str) -> Result<Option<Category>> {
        let conn = self.db.lock()?;
        let sql = format!("SELECT {} FROM categories WHERE id = ?1", COLUMNS);
        Ok(conn.query_row(&sql, params![id], Self::from_row).optional()?)
    }

    /// Look up the category holding an exact (part, theme, period) triple
    pub fn find_by_triple(&self, part: &str, theme: &str, period: &str) -> Result<Option<Category>> {
        let conn = self.db.lock()?;
        let sql = format!(
            "SELECT {} FROM categories WHERE part = ?1 AND theme = ?2 AND period = ?3",
            COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![part, theme, period], Self::from_row)
            .optional()?)
    }

    /// Insert a category; a UNIQUE violation maps to `Duplicate`
    pub fn insert(&self, category: &Category) -> Result<()> {
        let conn = self.db.lock()?;
        let result = conn.execute(
            "INSERT INTO categories (id, part, theme, period, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                category.id,
                category.part,
                category.theme,
                category.period,
                category.created_at.to_rfc3339()
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(MyeltsError::Duplicate(category.label()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Substring search over part, theme and period, case-insensitive for
    /// ASCII letters only (SQLite `lower()` folds nothing else). An empty
    /// query lists everything.
    pub fn search(&self, query: &str) -> Result<Vec<Category>> {
        let conn = self.db.lock()?;
        let query = query.trim().to_ascii_lowercase();

        let sql = format!(
            "SELECT {} FROM categories
             WHERE ?1 = ''
                OR instr(lower(part), ?1) > 0
                OR instr(lower(theme), ?1) > 0
                OR instr(lower(period), ?1) > 0
             ORDER BY part, theme, period",
            COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![query], Self::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All categories
    pub fn list(&self) -> Result<Vec<Category>> {
        self.search("")
    }
}
