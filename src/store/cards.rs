//! Card, question, answer and word writes.
//!
//! A registration is written in a single transaction so the four tables
//! never hold a partial card.

use rusqlite::params;
use tracing::debug;

use crate::domain::RegisteredCard;
use crate::error::Result;

use super::Database;

/// Card-side persistence
#[derive(Clone)]
pub struct CardRepository {
    db: Database,
}

impl CardRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Write card → question → answer → words atomically
    pub fn insert_registration(&self, registered: &RegisteredCard) -> Result<()> {
        let mut conn = self.db.lock()?;
        let tx = conn.transaction()?;

        let card = &registered.card;
        tx.execute(
            "INSERT INTO cards (id, user_id, category_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![card.id, card.user_id, card.category_id, card.created_at.to_rfc3339()],
        )?;

        let question = &registered.question;
        tx.execute(
            "INSERT INTO questions (id, card_id, text, audio_url) VALUES (?1, ?2, ?3, ?4)",
            params![question.id, question.card_id, question.text, question.audio_url],
        )?;

        let answer = &registered.answer;
        tx.execute(
            "INSERT INTO answers (id, card_id, text, audio_url) VALUES (?1, ?2, ?3, ?4)",
            params![answer.id, answer.card_id, answer.text, answer.audio_url],
        )?;

        if !registered.words.is_empty() {
            let mut stmt =
                tx.prepare("INSERT INTO words (id, answer_id, word, ipa) VALUES (?1, ?2, ?3, ?4)")?;
            for word in &registered.words {
                stmt.execute(params![word.id, word.answer_id, word.word, word.ipa])?;
            }
        }

        tx.commit()?;
        debug!(card_id = %card.id, words = registered.words.len(), "Card persisted");

        Ok(())
    }

    /// Number of words stored for an answer
    pub fn word_count(&self, answer_id: &str) -> Result<i64> {
        let conn = self.db.lock()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM words WHERE answer_id = ?1",
            params![answer_id],
            |row| row.get(0),
        )?)
    }
}
