//! Abstract persistence contract for the configuration service.
//!
//! The service layer is generic over [`ConfigStore`] so the same logic runs
//! against PostgreSQL in production and the in-memory store in tests.

use async_trait::async_trait;
use conflux_core::types::DbId;
use thiserror::Error;

use crate::models::{
    ConfigImport, ConfigTemplate, ConfigVersion, CreateTemplate, ImportUpdate, NewConfigImport,
    NewConfigVersion, NewUserConfig, UpdateTemplate, UserConfig,
};

/// Storage-level failures. Constraint violations are surfaced separately so
/// the service can map them to domain errors (duplicate names, version races).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint was violated; carries the constraint name.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Optional filters for template listing.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring match on name and display name.
    pub search: Option<String>,
}

/// Partial update for a document's mutable fields. `None` leaves the stored
/// value untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub format: Option<String>,
}

/// Persistence operations required by the configuration service.
///
/// List operations take a zero-based offset plus limit and return the page
/// alongside the unfiltered total for that scope.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    // ---------- Templates ----------

    async fn create_template(&self, input: &CreateTemplate) -> Result<ConfigTemplate, StoreError>;

    async fn get_template(&self, id: DbId) -> Result<Option<ConfigTemplate>, StoreError>;

    async fn list_templates(
        &self,
        filter: &TemplateFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigTemplate>, i64), StoreError>;

    async fn update_template(
        &self,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<ConfigTemplate>, StoreError>;

    /// Returns `true` if a row was deleted.
    async fn delete_template(&self, id: DbId) -> Result<bool, StoreError>;

    // ---------- Documents ----------

    /// Insert a document and its version-1 snapshot in one transaction.
    /// Either both rows land or neither does.
    async fn create_config_with_version(
        &self,
        input: &NewUserConfig,
        change_note: &str,
    ) -> Result<UserConfig, StoreError>;

    async fn get_config(&self, id: DbId) -> Result<Option<UserConfig>, StoreError>;

    /// Documents for a user, optionally restricted to one source template.
    async fn list_configs(
        &self,
        user_id: DbId,
        template_id: Option<DbId>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<UserConfig>, i64), StoreError>;

    /// Apply a metadata-only patch (no version snapshot).
    async fn update_config(
        &self,
        id: DbId,
        patch: &ConfigPatch,
    ) -> Result<Option<UserConfig>, StoreError>;

    /// Apply a patch and append a version snapshot in one transaction.
    /// Either both take effect or neither does.
    async fn update_config_with_version(
        &self,
        id: DbId,
        patch: &ConfigPatch,
        version: &NewConfigVersion,
    ) -> Result<Option<UserConfig>, StoreError>;

    async fn delete_config(&self, id: DbId) -> Result<bool, StoreError>;

    // ---------- Versions ----------

    /// Append a snapshot without touching the document row.
    async fn append_version(&self, input: &NewConfigVersion)
        -> Result<ConfigVersion, StoreError>;

    async fn get_version(&self, id: DbId) -> Result<Option<ConfigVersion>, StoreError>;

    /// Versions for a document, newest first.
    async fn list_versions(
        &self,
        config_id: DbId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigVersion>, i64), StoreError>;

    /// Highest version number for a document, `0` when none exist.
    async fn latest_version_number(&self, config_id: DbId) -> Result<i32, StoreError>;

    // ---------- Imports ----------

    async fn create_import(&self, input: &NewConfigImport) -> Result<ConfigImport, StoreError>;

    async fn get_import(&self, id: DbId) -> Result<Option<ConfigImport>, StoreError>;

    async fn list_imports(
        &self,
        user_id: DbId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigImport>, i64), StoreError>;

    async fn update_import(
        &self,
        id: DbId,
        update: &ImportUpdate,
    ) -> Result<Option<ConfigImport>, StoreError>;
}
