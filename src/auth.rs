//! Caller identity.
//!
//! Authentication itself is handled outside this crate; callers hand in the
//! user id they resolved. Writes and per-user reads require one.

use serde::{Deserialize, Serialize};

use crate::error::{MyeltsError, Result};

/// Opaque user identifier supplied by the authentication provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier; blank ids are treated as absent
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fail with `Unauthorized` unless an identity is present
pub fn require_user(user: Option<&UserId>) -> Result<&UserId> {
    user.ok_or(MyeltsError::Unauthorized)
}

/// Resolve the identity for this process (MYELTS_USER_ID, then config)
pub fn current_user() -> Option<UserId> {
    if let Ok(raw) = std::env::var("MYELTS_USER_ID") {
        if let Some(user) = UserId::parse(&raw) {
            return Some(user);
        }
    }

    crate::config::config()
        .ok()
        .and_then(|cfg| cfg.user_id.as_deref())
        .and_then(UserId::parse)
}
