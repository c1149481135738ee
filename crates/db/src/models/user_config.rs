//! User configuration document model and DTOs.

use conflux_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_configs` table.
///
/// Invariant: `content` parses under `format` at the moment it is
/// persisted — the service never stores unparseable content.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserConfig {
    pub id: DbId,
    pub user_id: DbId,
    /// Source template, `None` for custom documents.
    pub template_id: Option<DbId>,
    pub name: String,
    pub description: String,
    pub format: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields for inserting a new document. Assembled by the service, never
/// taken directly from a request body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserConfig {
    pub user_id: DbId,
    pub template_id: Option<DbId>,
    pub name: String,
    pub description: String,
    pub format: String,
    pub content: String,
}
