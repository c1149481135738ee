//! Configuration template model and DTOs.

use conflux_core::template::ConfigVariable;
use conflux_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `config_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConfigTemplate {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Template revision label (e.g. `"1.0.0"`), maintained by admins.
    pub version: String,
    pub category: String,
    /// Canonical format of `default_content` (lowercase, validated in core).
    pub format: String,
    pub default_content: String,
    /// Optional JSON-schema document applied during validation.
    pub schema: Option<String>,
    /// Declared variables, stored as a JSONB array of [`ConfigVariable`].
    pub variables: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ConfigTemplate {
    /// Decode the JSONB `variables` column.
    pub fn declared_variables(&self) -> Result<Vec<ConfigVariable>, serde_json::Error> {
        serde_json::from_value(self.variables.clone())
    }
}

/// DTO for creating a new template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub format: String,
    pub default_content: String,
    pub schema: Option<String>,
    #[serde(default)]
    pub variables: Vec<ConfigVariable>,
}

/// DTO for updating an existing template. Only non-`None` fields apply;
/// the stored format is never changed by an update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplate {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub default_content: Option<String>,
    pub schema: Option<String>,
    pub variables: Option<Vec<ConfigVariable>>,
}
