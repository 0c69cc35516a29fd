//! Session identifiers substituted for `%session_id%`

use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::error::{Result, SqlRenderError};

/// Length of every session identifier
pub const SESSION_ID_LENGTH: usize = 8;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const ALPHANUMERICS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

static GLOBAL_SESSION_ID: Lazy<String> = Lazy::new(generate_session_id);

/// Generates a random session identifier: lowercase alphanumerics, starting
/// with a letter.
pub fn generate_session_id() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    bytes
        .iter()
        .take(SESSION_ID_LENGTH)
        .enumerate()
        .map(|(i, &b)| {
            let alphabet = if i == 0 { LETTERS } else { ALPHANUMERICS };
            alphabet[b as usize % alphabet.len()] as char
        })
        .collect()
}

/// The identifier used when the caller does not supply one. Generated once
/// per process.
pub fn global_session_id() -> &'static str {
    &GLOBAL_SESSION_ID
}

/// Checks that `session_id` has the shape produced by [`generate_session_id`].
pub fn validate_session_id(session_id: &str) -> Result<()> {
    let invalid = |reason: String| SqlRenderError::InvalidSessionId {
        session_id: session_id.to_string(),
        reason,
    };
    let length = session_id.chars().count();
    if length != SESSION_ID_LENGTH {
        return Err(invalid(format!(
            "has length {}, should be {}",
            length, SESSION_ID_LENGTH
        )));
    }
    if !session_id.chars().next().is_some_and(char::is_alphabetic) {
        return Err(invalid("does not start with a letter".to_string()));
    }
    if !session_id.chars().all(char::is_alphanumeric) {
        return Err(invalid("contains an illegal character".to_string()));
    }
    Ok(())
}
