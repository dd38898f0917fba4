//! Input checks run before any external call.
//!
//! Card texts are limited to a conservative character set (ASCII letters,
//! digits, whitespace and common punctuation) and a maximum length.

use crate::error::{MyeltsError, Result};

/// Punctuation accepted in question and answer texts
pub const ALLOWED_PUNCTUATION: &[char] = &[',', '.', '?', '!', ':', ';', '\'', '’', '"', '-'];

/// Whether a character may appear in a card text
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || ALLOWED_PUNCTUATION.contains(&c)
}

/// Require a non-blank value, returning it trimmed
pub fn require_field<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MyeltsError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Validate a question or answer text, returning it trimmed
pub fn validate_card_text<'a>(field: &str, value: &'a str, max_chars: usize) -> Result<&'a str> {
    let trimmed = require_field(field, value)?;

    let chars = trimmed.chars().count();
    if chars > max_chars {
        return Err(MyeltsError::Validation(format!(
            "{} is too long: {} > {} characters",
            field, chars, max_chars
        )));
    }

    if let Some(bad) = trimmed.chars().find(|c| !is_allowed_char(*c)) {
        return Err(MyeltsError::Validation(format!(
            "{} contains unsupported character {:?}",
            field, bad
        )));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field() {
        assert_eq!(require_field("part", "  Part 2 ").unwrap(), "Part 2");
        assert!(matches!(
            require_field("part", "   "),
            Err(MyeltsError::Validation(_))
        ));
    }

    #[test]
    fn test_allowed_text() {
        let text = "Well, it's a \"quiet\" place - isn't it? Yes: 100% sure!";
        // '%' is outside the set
        assert!(validate_card_text("answer", text, 2000).is_err());

        let text = "Well, it's a \"quiet\" place - isn’t it? Yes: quite; sure!";
        assert_eq!(validate_card_text("answer", text, 2000).unwrap(), text);
    }

    #[test]
    fn test_rejects_non_ascii_letters() {
        assert!(validate_card_text("question", "Café culture", 2000).is_err());
        assert!(validate_card_text("question", "図書館", 2000).is_err());
    }

    #[test]
    fn test_length_limit() {
        assert!(validate_card_text("answer", "abcde", 5).is_ok());
        assert!(validate_card_text("answer", "abcdef", 5).is_err());
    }
}
