//! Core application logic.
//!
//! This module contains:
//! - Registration: the QA registration pipeline (fan-out/fan-in + persistence)
//! - Categories: the create-or-reject category registry
//! - Validation: input checks run before any external call

pub mod categories;
pub mod registration;
pub mod validation;

// Re-export commonly used types
pub use categories::CategoryRegistry;
pub use registration::{QaInput, Registrar};
pub use validation::{is_allowed_char, validate_card_text};
