//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. List endpoints add
//! pagination metadata alongside the data array.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Paginated list envelope: `{ "data": [...], "total": n, "page": p, "limit": l }`.
///
/// `total` is the number of matching rows before pagination; `page` and
/// `limit` echo the clamped values actually applied.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}
