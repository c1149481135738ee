//! Validation rules and version-note constants for user configuration
//! documents.

use crate::error::CoreError;

/// Change note attached to the version created alongside a new document.
pub const INITIAL_VERSION_NOTE: &str = "Initial version";

/// Maximum length of a document or template name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a user-supplied change note.
pub const MAX_CHANGE_NOTE_LEN: usize = 500;

/// Maximum size of stored configuration content, in bytes.
pub const MAX_CONTENT_LEN: usize = 1_000_000;

/// Change note synthesized when a document is restored to an older version.
pub fn restore_note(version: i32) -> String {
    format!("Restored to version {version}")
}

/// Validate a document/template name (non-empty, <= 100 chars).
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a change note (may be empty, <= 500 chars).
pub fn validate_change_note(note: &str) -> Result<(), CoreError> {
    if note.len() > MAX_CHANGE_NOTE_LEN {
        return Err(CoreError::Validation(format!(
            "Change note must be at most {MAX_CHANGE_NOTE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate configuration content size.
pub fn validate_content_size(content: &str) -> Result<(), CoreError> {
    if content.len() > MAX_CONTENT_LEN {
        return Err(CoreError::Validation(format!(
            "Content must be at most {MAX_CONTENT_LEN} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_valid() {
        assert!(validate_name("my nginx config").is_ok());
    }

    #[test]
    fn name_empty_rejected() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn name_too_long_rejected() {
        assert!(validate_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn change_note_may_be_empty() {
        assert!(validate_change_note("").is_ok());
    }

    #[test]
    fn change_note_too_long_rejected() {
        assert!(validate_change_note(&"x".repeat(501)).is_err());
    }

    #[test]
    fn restore_note_format() {
        assert_eq!(restore_note(3), "Restored to version 3");
    }
}
