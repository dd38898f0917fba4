//! Read model for study sessions.
//!
//! Given a user and a category, returns the user's cards in creation order,
//! each with its question, answer, audio URLs and extracted words.

use std::collections::HashMap;

use rusqlite::params;
use tracing::{debug, error};

use crate::auth::UserId;
use crate::domain::{CardView, ExtractedWord};
use crate::error::Result;

use super::Database;

/// Joins cards, questions, answers and words into `CardView`s
#[derive(Clone)]
pub struct CardQuery {
    db: Database,
}

impl CardQuery {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Cards owned by `user` in `category_id`, oldest first
    pub fn cards_for(&self, user: &UserId, category_id: &str) -> Result<Vec<CardView>> {
        let conn = self.db.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, q.text, q.audio_url, a.text, a.audio_url
            FROM cards c
            JOIN questions q ON q.card_id = c.id
            JOIN answers a ON a.card_id = c.id
            WHERE c.user_id = ?1 AND c.category_id = ?2
            ORDER BY c.created_at, c.rowid
            "#,
        )?;

        let mut cards = stmt
            .query_map(params![user.as_str(), category_id], |row| {
                Ok(CardView {
                    card_id: row.get(0)?,
                    question: row.get(1)?,
                    question_audio: row.get(2)?,
                    answer: row.get(3)?,
                    answer_audio: row.get(4)?,
                    words: Vec::new(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT a.card_id, w.word, w.ipa
            FROM words w
            JOIN answers a ON a.id = w.answer_id
            JOIN cards c ON c.id = a.card_id
            WHERE c.user_id = ?1 AND c.category_id = ?2
            ORDER BY w.rowid
            "#,
        )?;

        let mut words: HashMap<String, Vec<ExtractedWord>> = HashMap::new();
        let rows = stmt.query_map(params![user.as_str(), category_id], |row| {
            Ok((row.get::<_, String>(0)?, ExtractedWord::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
        })?;
        for row in rows {
            let (card_id, word) = row?;
            words.entry(card_id).or_default().push(word);
        }

        for card in &mut cards {
            if let Some(list) = words.remove(&card.card_id) {
                card.words = list;
            }
        }

        debug!(user = %user, category_id, count = cards.len(), "Loaded cards");
        Ok(cards)
    }
}

/// Read path used by the study screen: failures are logged and shown as an
/// empty category instead of aborting the view
pub fn load_cards_or_empty(query: &CardQuery, user: &UserId, category_id: &str) -> Vec<CardView> {
    match query.cards_for(user, category_id) {
        Ok(cards) => cards,
        Err(e) => {
            error!(category_id, error = %e, "Failed to load cards");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Answer, Card, Category, Question, RegisteredCard, Word};

    fn register(db: &Database, user: &str, category_id: &str, answer_text: &str, words: &[&str]) -> String {
        let card = Card::new(user, category_id);
        let question = Question::new(&card.id, format!("Q: {}", answer_text), "file:///q.mp3");
        let answer = Answer::new(&card.id, answer_text, "file:///a.mp3");
        let words = words
            .iter()
            .map(|w| Word::new(&answer.id, &ExtractedWord::new(*w, format!("/{}/", w))))
            .collect();
        let card_id = card.id.clone();

        db.cards()
            .insert_registration(&RegisteredCard {
                card,
                question,
                answer,
                words,
            })
            .unwrap();
        card_id
    }

    #[test]
    fn test_cards_scoped_to_user_and_category() {
        let db = Database::open_in_memory().unwrap();
        let place = Category::new("Part 2", "Describe a place", "2024-Q1");
        let city = Category::new("Part 3", "Cities", "2024-Q1");
        db.categories().insert(&place).unwrap();
        db.categories().insert(&city).unwrap();

        let first = register(&db, "user_1", &place.id, "The library is a quiet place.", &["quiet"]);
        let second = register(&db, "user_1", &place.id, "It has tall windows.", &[]);
        register(&db, "user_2", &place.id, "Someone else's card.", &["else"]);
        register(&db, "user_1", &city.id, "A big city.", &[]);

        let user = UserId::parse("user_1").unwrap();
        let cards = db.card_query().cards_for(&user, &place.id).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].card_id, first);
        assert_eq!(cards[1].card_id, second);
        assert_eq!(cards[0].words, vec![ExtractedWord::new("quiet", "/quiet/")]);
        assert!(cards[1].words.is_empty());
        assert_eq!(cards[0].answer_audio, "file:///a.mp3");
    }

    #[test]
    fn test_empty_category() {
        let db = Database::open_in_memory().unwrap();
        let user = UserId::parse("user_1").unwrap();

        let cards = load_cards_or_empty(&db.card_query(), &user, "no-such-category");
        assert!(cards.is_empty());
    }

    #[test]
    fn test_read_error_shows_no_cards() {
        let db = Database::open_in_memory().unwrap();
        let place = Category::new("Part 2", "Describe a place", "2024-Q1");
        db.categories().insert(&place).unwrap();
        register(&db, "user_1", &place.id, "The library is a quiet place.", &["quiet"]);

        db.lock().unwrap().execute_batch("DROP TABLE words;").unwrap();

        let user = UserId::parse("user_1").unwrap();
        assert!(db.card_query().cards_for(&user, &place.id).is_err());
        assert!(load_cards_or_empty(&db.card_query(), &user, &place.id).is_empty());
    }
}
