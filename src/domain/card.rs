//! Cards and the rows hanging off them.
//!
//! A card is created once by the registration pipeline together with its
//! question, answer and extracted words, and is never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One question/answer study unit owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(user_id: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            category_id: category_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Question side of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub card_id: String,
    pub text: String,

    /// Public URL of the synthesized audio
    pub audio_url: String,
}

impl Question {
    pub fn new(card_id: &str, text: impl Into<String>, audio_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            card_id: card_id.to_string(),
            text: text.into(),
            audio_url: audio_url.into(),
        }
    }
}

/// Answer side of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: String,
    pub card_id: String,
    pub text: String,

    /// Public URL of the synthesized audio
    pub audio_url: String,
}

impl Answer {
    pub fn new(card_id: &str, text: impl Into<String>, audio_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            card_id: card_id.to_string(),
            text: text.into(),
            audio_url: audio_url.into(),
        }
    }
}

/// A notable word extracted from an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: String,
    pub answer_id: String,
    pub word: String,
    pub ipa: String,
}

impl Word {
    pub fn new(answer_id: &str, extracted: &ExtractedWord) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            answer_id: answer_id.to_string(),
            word: extracted.word.clone(),
            ipa: extracted.ipa.clone(),
        }
    }
}

/// A (word, IPA) pair as returned by the vocabulary extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedWord {
    pub word: String,
    #[serde(default)]
    pub ipa: String,
}

impl ExtractedWord {
    pub fn new(word: impl Into<String>, ipa: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ipa: ipa.into(),
        }
    }
}

/// Everything written by one successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredCard {
    pub card: Card,
    pub question: Question,
    pub answer: Answer,
    pub words: Vec<Word>,
}

/// Display-ready card, joined at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub card_id: String,
    pub question: String,
    pub question_audio: String,
    pub answer: String,
    pub answer_audio: String,
    pub words: Vec<ExtractedWord>,
}

impl CardView {
    /// Text shown for the given side
    pub fn text(&self, side: Side) -> &str {
        match side {
            Side::Question => &self.question,
            Side::Answer => &self.answer,
        }
    }

    /// Audio URL for the given side
    pub fn audio(&self, side: Side) -> &str {
        match side {
            Side::Question => &self.question_audio,
            Side::Answer => &self.answer_audio,
        }
    }
}

/// Visible side of a flip card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Question,
    Answer,
}

impl Side {
    pub fn flipped(self) -> Self {
        match self {
            Self::Question => Self::Answer,
            Self::Answer => Self::Question,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Question => write!(f, "Question"),
            Self::Answer => write!(f, "Answer"),
        }
    }
}
