//! myelts - Flashcards with synthesized audio for speaking-exam practice
//!
//! Users register question/answer pairs under a (part, theme, period)
//! category. Registration synthesizes audio for both sides, extracts
//! notable vocabulary with IPA from the answer, uploads the audio and
//! stores everything as one card. Cards are then studied as flip cards,
//! manually or with auto-play.
//!
//! # Modules
//!
//! - `adapters`: External services (Google TTS, OpenAI, Supabase Storage, audio player)
//! - `core`: Registration pipeline, category registry, input validation
//! - `store`: SQLite persistence and the card read model
//! - `study`: Study session state machine and its async driver
//! - `domain`: Data structures (Category, Card, CardView)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Create a category
//! myelts category add --part "Part 2" --theme "Describe a place" --period "2024-Q1"
//!
//! # Register a card
//! myelts qa add --category <id> --question "Describe a quiet place." \
//!     --answer "The library is a quiet place."
//!
//! # Study with auto-play
//! myelts study <id> --auto
//! ```

pub mod adapters;
pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod store;
pub mod study;

// Re-export main types at crate root for convenience
pub use auth::UserId;
pub use crate::core::{CategoryRegistry, QaInput, Registrar};
pub use domain::{Card, CardView, Category, ExtractedWord, RegisteredCard, Side};
pub use error::{MyeltsError, Result};
pub use store::{CardQuery, Database};
pub use study::{Effect, SessionDriver, StudyEvent, StudySession};
