//! Error taxonomy shared by the registration pipeline, the category
//! registry and the card query.

use thiserror::Error;

/// Result alias used across the library
pub type Result<T, E = MyeltsError> = std::result::Result<T, E>;

/// Errors surfaced to callers of the library
#[derive(Debug, Error)]
pub enum MyeltsError {
    /// Missing or invalid input, rejected before any external call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No authenticated identity for a call that needs one
    #[error("Not authenticated")]
    Unauthorized,

    /// A category with the same (part, theme, period) already exists
    #[error("Category already exists: {0}")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Speech synthesis, vocabulary extraction or object storage failed
    #[error("{service} failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl MyeltsError {
    /// Build an upstream error from any displayable cause
    pub fn upstream(service: &'static str, cause: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service,
            message: cause.to_string(),
        }
    }

    /// Whether the error was caused by the caller's input rather than the system
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Unauthorized | Self::Duplicate(_) | Self::NotFound(_)
        )
    }
}
