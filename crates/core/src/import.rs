//! Import source and lifecycle constants.
//!
//! An import record is created `pending`, moves to `processing`, and ends
//! in exactly one terminal state. The async fetch itself lives outside this
//! core; it reports back through the status-update interface, which
//! enforces these transitions.

pub const SOURCE_LOCAL: &str = "local";
pub const SOURCE_URL: &str = "url";
pub const SOURCE_GITHUB: &str = "github";
pub const SOURCE_GITLAB: &str = "gitlab";

/// All valid import source types.
pub const VALID_SOURCE_TYPES: &[&str] = &[SOURCE_LOCAL, SOURCE_URL, SOURCE_GITHUB, SOURCE_GITLAB];

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";

/// All valid import statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_PROCESSING,
    STATUS_COMPLETED,
    STATUS_FAILED,
];

pub fn is_valid_source_type(source_type: &str) -> bool {
    VALID_SOURCE_TYPES.contains(&source_type)
}

pub fn is_valid_status(status: &str) -> bool {
    VALID_STATUSES.contains(&status)
}

/// Terminal statuses admit no further transitions.
pub fn is_terminal_status(status: &str) -> bool {
    status == STATUS_COMPLETED || status == STATUS_FAILED
}

/// Whether an import may move from `from` to `to`.
pub fn can_transition(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        (STATUS_PENDING, STATUS_PROCESSING)
            | (STATUS_PROCESSING, STATUS_COMPLETED)
            | (STATUS_PROCESSING, STATUS_FAILED)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_types() {
        assert!(is_valid_source_type("github"));
        assert!(!is_valid_source_type("ftp"));
    }

    #[test]
    fn legal_transitions() {
        assert!(can_transition(STATUS_PENDING, STATUS_PROCESSING));
        assert!(can_transition(STATUS_PROCESSING, STATUS_COMPLETED));
        assert!(can_transition(STATUS_PROCESSING, STATUS_FAILED));
    }

    #[test]
    fn illegal_transitions() {
        assert!(!can_transition(STATUS_PENDING, STATUS_COMPLETED));
        assert!(!can_transition(STATUS_COMPLETED, STATUS_PROCESSING));
        assert!(!can_transition(STATUS_FAILED, STATUS_PENDING));
        assert!(!can_transition(STATUS_PROCESSING, STATUS_PROCESSING));
    }

    #[test]
    fn terminal_statuses() {
        assert!(is_terminal_status(STATUS_COMPLETED));
        assert!(is_terminal_status(STATUS_FAILED));
        assert!(!is_terminal_status(STATUS_PENDING));
        assert!(!is_terminal_status(STATUS_PROCESSING));
    }
}
