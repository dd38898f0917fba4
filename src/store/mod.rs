//! SQLite-backed relational store.
//!
//! Five tables: categories, cards, questions, answers, words. The schema is
//! created on open; foreign keys are enforced.
//!
//! The connection sits behind `Arc<Mutex<_>>` so repositories can be cloned
//! into async tasks. Locks are held only for the duration of one statement
//! or transaction and never across an `.await`.

pub mod card_query;
pub mod cards;
pub mod categories;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::error::{MyeltsError, Result};

pub use card_query::{load_cards_or_empty, CardQuery};
pub use cards::CardRepository;
pub use categories::CategoryRepository;

const SCHEMA: &str = include_str!("schema.sql");

/// Shared handle to the SQLite database
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub categories: i64,
    pub cards: i64,
    pub questions: i64,
    pub answers: i64,
    pub words: i64,
}

impl Database {
    /// Open (or create) the database file and apply the schema
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// In-memory database (tests, dry runs)
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| MyeltsError::Lock(e.to_string()))
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.clone())
    }

    pub fn cards(&self) -> CardRepository {
        CardRepository::new(self.clone())
    }

    pub fn card_query(&self) -> CardQuery {
        CardQuery::new(self.clone())
    }

    /// Count rows in every table
    pub fn row_counts(&self) -> Result<RowCounts> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<i64> {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            Ok(conn.query_row(&sql, [], |row| row.get(0))?)
        };

        Ok(RowCounts {
            categories: count("categories")?,
            cards: count("cards")?,
            questions: count("questions")?,
            answers: count("answers")?,
            words: count("words")?,
        })
    }
}

/// Parse an RFC 3339 timestamp column
pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
