//! Request validation for the triage server
//!
//! Session identifiers arrive from untrusted clients and end up in logs and
//! transcript files, so they are restricted to a short printable alphabet.

use thiserror::Error;

/// Longest accepted session identifier
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Validation errors for inbound requests
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("session id must not be empty")]
    EmptySessionId,

    #[error("session id exceeds {max} characters")]
    SessionIdTooLong { max: usize },

    #[error("session id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Check a client-supplied session identifier.
///
/// Accepts ASCII letters, digits and `-_.:@`.
pub fn validate_session_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptySessionId);
    }

    if id.chars().count() > MAX_SESSION_ID_LEN {
        return Err(ValidationError::SessionIdTooLong {
            max: MAX_SESSION_ID_LEN,
        });
    }

    if let Some(bad) = id.chars().find(|c| !is_allowed(*c)) {
        return Err(ValidationError::InvalidCharacter(bad));
    }

    Ok(())
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '@')
}
