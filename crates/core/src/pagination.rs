//! Pagination defaults and clamp helpers shared by list operations.

/// Default number of rows per page for template and document lists.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum number of rows per page for template and document lists.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default number of rows per page for version history.
pub const DEFAULT_VERSION_PAGE_SIZE: i64 = 10;

/// Maximum number of rows per page for version history.
pub const MAX_VERSION_PAGE_SIZE: i64 = 50;

/// Clamp a 1-based page number: anything below 1 (or absent) becomes 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.filter(|p| *p >= 1).unwrap_or(1)
}

/// Clamp a page size into `1..=max`, falling back to `default` when absent
/// or out of range.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    match limit {
        Some(l) if l >= 1 && l <= max => l,
        _ => default,
    }
}

/// Convert a clamped (page, limit) pair to a row offset.
pub fn offset(page: i64, limit: i64) -> i64 {
    (page - 1) * limit
}
