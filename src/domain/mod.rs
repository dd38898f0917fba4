//! Domain types for myelts.
//!
//! This module contains the core data structures:
//! - Category: (part, theme, period) grouping tag
//! - Card, Question, Answer, Word: one registered study unit
//! - CardView: the denormalized read model used by study sessions

pub mod card;
pub mod category;

// Re-export commonly used types
pub use card::{Answer, Card, CardView, ExtractedWord, Question, RegisteredCard, Side, Word};
pub use category::{format_category, Category};
