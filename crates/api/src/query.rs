//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?page=&limit=`).
///
/// Pages are 1-based. Values are clamped in the service layer via
/// `conflux_core::pagination`.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
