//! Version history model.
//!
//! Versions are immutable snapshots: created when a document is created
//! and on every successful update, never mutated or deleted afterwards
//! (they disappear only when their document is deleted).

use conflux_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `config_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConfigVersion {
    pub id: DbId,
    pub config_id: DbId,
    /// 1-based, strictly increasing, gap-free per document. Assigned by
    /// the service, never client-supplied.
    pub version: i32,
    pub content: String,
    pub change_note: String,
    pub created_by: DbId,
    pub created_at: Timestamp,
}

/// Fields for appending a new version snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConfigVersion {
    pub config_id: DbId,
    pub version: i32,
    pub content: String,
    pub change_note: String,
    pub created_by: DbId,
}
