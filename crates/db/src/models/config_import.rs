//! External-source import record model and DTOs.

use conflux_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `config_imports` table.
///
/// `source_type` and `status` are lowercase strings validated against the
/// constant sets in `conflux_core::import`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConfigImport {
    pub id: DbId,
    pub user_id: DbId,
    pub source_type: String,
    pub source_url: String,
    pub status: String,
    pub error_message: Option<String>,
    /// The resulting document, populated on completion.
    pub config_id: Option<DbId>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// Fields for creating a new import record (always starts `pending`).
#[derive(Debug, Clone, Deserialize)]
pub struct NewConfigImport {
    pub user_id: DbId,
    pub source_type: String,
    pub source_url: String,
}

/// Status transition applied by the import processor callback.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportUpdate {
    pub status: String,
    pub error_message: Option<String>,
    pub config_id: Option<DbId>,
    pub completed_at: Option<Timestamp>,
}
