//! The configuration service: template management, versioned user
//! documents, format operations, and import tracking.
//!
//! Generic over [`ConfigStore`] so the same logic runs against PostgreSQL
//! in production and `MemoryStore` in tests. All methods return
//! [`CoreError`]; the handler layer maps them to HTTP responses.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use conflux_core::document::{
    restore_note, validate_change_note, validate_content_size, validate_name,
    INITIAL_VERSION_NOTE,
};
use conflux_core::error::CoreError;
use conflux_core::format::{
    convert_format, detect_format, parse_config, validate_against_schema, ConfigFormat,
};
use conflux_core::pagination::{
    clamp_limit, clamp_page, offset, DEFAULT_PAGE_SIZE, DEFAULT_VERSION_PAGE_SIZE, MAX_PAGE_SIZE,
    MAX_VERSION_PAGE_SIZE,
};
use conflux_core::template::{validate_variable, validate_variables};
use conflux_core::types::DbId;
use conflux_core::import::{can_transition, is_terminal_status, is_valid_source_type, is_valid_status};

use conflux_db::models::{
    ConfigImport, ConfigTemplate, ConfigVersion, CreateTemplate, ImportUpdate, NewConfigImport,
    NewConfigVersion, NewUserConfig, UpdateTemplate, UserConfig,
};
use conflux_db::repositories::{ConfigPatch, ConfigStore, StoreError, TemplateFilter};

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// Body for `POST /configs`. With `template_id` the document is seeded from
/// the template; without it, `content` is required and `format` is detected
/// when omitted.
#[derive(Debug, Deserialize)]
pub struct CreateConfigRequest {
    pub template_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub format: Option<String>,
    pub content: Option<String>,
}

/// Body for `PUT /configs/{id}`. A content change appends a version
/// snapshot; metadata-only changes do not. `format` overrides the stored
/// format: the (new or existing) content is validated under it and the
/// document is re-labeled.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateConfigRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub format: Option<String>,
    pub change_note: Option<String>,
}

/// Body for `POST /imports`.
#[derive(Debug, Deserialize)]
pub struct CreateImportRequest {
    pub source_type: String,
    pub source_url: String,
}

/// Body for `PUT /imports/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateImportRequest {
    pub status: String,
    pub error_message: Option<String>,
    pub config_id: Option<DbId>,
}

/// Result of a content validation request. Syntax, schema, and variable
/// problems are reported here rather than as errors; only infrastructure
/// failures and unknown formats escalate to [`CoreError`].
#[derive(Debug, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub format: String,
    pub errors: Vec<String>,
}

/// Result of a format conversion request.
#[derive(Debug, Serialize)]
pub struct ConvertedContent {
    pub content: String,
    pub from: String,
    pub to: String,
}

/// A document rendered for download.
#[derive(Debug)]
pub struct ExportedConfig {
    pub filename: String,
    pub content: String,
    pub format: ConfigFormat,
}

/// One page of a listing plus the clamped pagination actually applied.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// Store error mapping
// ---------------------------------------------------------------------------

/// Constraint prefix for the per-user document name uniqueness rule.
const NAME_CONSTRAINT_PREFIX: &str = "uq_user_configs";
/// Constraint prefix for the per-document version number uniqueness rule.
const VERSION_CONSTRAINT_PREFIX: &str = "uq_config_versions";

fn map_store_error(err: StoreError) -> CoreError {
    match err {
        StoreError::UniqueViolation(constraint)
            if constraint.starts_with(NAME_CONSTRAINT_PREFIX) =>
        {
            CoreError::Validation("A configuration with this name already exists".to_string())
        }
        StoreError::UniqueViolation(constraint) => CoreError::Conflict(format!(
            "Duplicate value violates unique constraint: {constraint}"
        )),
        StoreError::Backend(msg) => CoreError::Internal(msg),
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Domain operations over templates, documents, versions, and imports.
pub struct ConfigService<S> {
    store: S,
}

impl<S: ConfigStore> ConfigService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ---------- Templates ----------

    /// Create a template. The default content must parse under the declared
    /// format, the schema (if any) must be valid JSON, and every declared
    /// variable must be well-formed.
    pub async fn create_template(
        &self,
        input: CreateTemplate,
    ) -> Result<ConfigTemplate, CoreError> {
        validate_name(&input.name)?;
        validate_name(&input.display_name)?;

        let format = ConfigFormat::from_str(&input.format)?;
        parse_config(&input.default_content, format)?;

        if let Some(schema) = &input.schema {
            ensure_schema_is_json(schema)?;
        }
        for var in &input.variables {
            validate_variable(var)?;
        }

        self.store
            .create_template(&input)
            .await
            .map_err(map_store_error)
    }

    pub async fn get_template(&self, id: DbId) -> Result<ConfigTemplate, CoreError> {
        self.store
            .get_template(id)
            .await
            .map_err(map_store_error)?
            .ok_or(CoreError::NotFound {
                entity: "template",
                id,
            })
    }

    pub async fn list_templates(
        &self,
        filter: TemplateFilter,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Page<ConfigTemplate>, CoreError> {
        let page = clamp_page(page);
        let limit = clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let (items, total) = self
            .store
            .list_templates(&filter, offset(page, limit), limit)
            .await
            .map_err(map_store_error)?;
        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    /// Update a template. The stored format never changes; new default
    /// content must parse under it.
    pub async fn update_template(
        &self,
        id: DbId,
        input: UpdateTemplate,
    ) -> Result<ConfigTemplate, CoreError> {
        let existing = self.get_template(id).await?;

        if let Some(display_name) = &input.display_name {
            validate_name(display_name)?;
        }
        if let Some(default_content) = &input.default_content {
            let format = ConfigFormat::from_str(&existing.format)?;
            parse_config(default_content, format)?;
        }
        if let Some(schema) = &input.schema {
            ensure_schema_is_json(schema)?;
        }
        if let Some(variables) = &input.variables {
            for var in variables {
                validate_variable(var)?;
            }
        }

        self.store
            .update_template(id, &input)
            .await
            .map_err(map_store_error)?
            .ok_or(CoreError::NotFound {
                entity: "template",
                id,
            })
    }

    pub async fn delete_template(&self, id: DbId) -> Result<(), CoreError> {
        let deleted = self
            .store
            .delete_template(id)
            .await
            .map_err(map_store_error)?;
        if !deleted {
            return Err(CoreError::NotFound {
                entity: "template",
                id,
            });
        }
        Ok(())
    }

    // ---------- Documents ----------

    /// Create a document, either seeded from a template or from caller
    /// content. Always records version 1 with the initial change note.
    pub async fn create_config(
        &self,
        user_id: DbId,
        req: CreateConfigRequest,
    ) -> Result<UserConfig, CoreError> {
        validate_name(&req.name)?;

        let new_config = match req.template_id {
            Some(template_id) => {
                let template = self.get_template(template_id).await?;
                NewUserConfig {
                    user_id,
                    template_id: Some(template_id),
                    name: req.name,
                    description: req.description.unwrap_or_default(),
                    format: template.format.clone(),
                    content: template.default_content.clone(),
                }
            }
            None => {
                let content = req.content.ok_or_else(|| {
                    CoreError::Validation(
                        "Either template_id or content must be provided".to_string(),
                    )
                })?;
                validate_content_size(&content)?;
                let format = match &req.format {
                    Some(f) => ConfigFormat::from_str(f)?,
                    None => detect_format(&content)?,
                };
                parse_config(&content, format)?;
                NewUserConfig {
                    user_id,
                    template_id: None,
                    name: req.name,
                    description: req.description.unwrap_or_default(),
                    format: format.to_string(),
                    content,
                }
            }
        };

        let config = self
            .store
            .create_config_with_version(&new_config, INITIAL_VERSION_NOTE)
            .await
            .map_err(map_store_error)?;

        tracing::info!(
            user_id,
            config_id = config.id,
            format = %config.format,
            "Configuration created"
        );
        Ok(config)
    }

    pub async fn get_config(&self, user_id: DbId, id: DbId) -> Result<UserConfig, CoreError> {
        self.owned_config(user_id, id).await
    }

    pub async fn list_configs(
        &self,
        user_id: DbId,
        template_id: Option<DbId>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Page<UserConfig>, CoreError> {
        let page = clamp_page(page);
        let limit = clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let (items, total) = self
            .store
            .list_configs(user_id, template_id, offset(page, limit), limit)
            .await
            .map_err(map_store_error)?;
        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    /// Update a document. The effective format is the request's override or
    /// the stored format; content changes are parse-validated under it and
    /// append a version snapshot atomically, so invalid content leaves both
    /// the document and its history untouched.
    pub async fn update_config(
        &self,
        user_id: DbId,
        id: DbId,
        req: UpdateConfigRequest,
    ) -> Result<UserConfig, CoreError> {
        let config = self.owned_config(user_id, id).await?;

        if let Some(name) = &req.name {
            validate_name(name)?;
        }
        if let Some(note) = &req.change_note {
            validate_change_note(note)?;
        }

        let effective = match &req.format {
            Some(f) => ConfigFormat::from_str(f)?,
            None => ConfigFormat::from_str(&config.format)?,
        };

        let patch = ConfigPatch {
            name: req.name,
            description: req.description,
            content: req.content.clone(),
            format: req.format.map(|_| effective.to_string()),
        };

        let Some(content) = req.content else {
            // No new content. A format override still has to hold for the
            // stored content before the document gets re-labeled.
            if patch.format.is_some() {
                parse_config(&config.content, effective)?;
            }
            return self
                .store
                .update_config(id, &patch)
                .await
                .map_err(map_store_error)?
                .ok_or(CoreError::NotFound {
                    entity: "configuration",
                    id,
                });
        };

        validate_content_size(&content)?;
        parse_config(&content, effective)?;

        let note = req.change_note.unwrap_or_default();
        self.apply_versioned_update(user_id, id, patch, &content, note)
            .await
    }

    pub async fn delete_config(&self, user_id: DbId, id: DbId) -> Result<(), CoreError> {
        self.owned_config(user_id, id).await?;
        let deleted = self
            .store
            .delete_config(id)
            .await
            .map_err(map_store_error)?;
        if !deleted {
            return Err(CoreError::NotFound {
                entity: "configuration",
                id,
            });
        }
        tracing::info!(user_id, config_id = id, "Configuration deleted");
        Ok(())
    }

    // ---------- Versions ----------

    pub async fn list_versions(
        &self,
        user_id: DbId,
        config_id: DbId,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Page<ConfigVersion>, CoreError> {
        self.owned_config(user_id, config_id).await?;
        let page = clamp_page(page);
        let limit = clamp_limit(limit, DEFAULT_VERSION_PAGE_SIZE, MAX_VERSION_PAGE_SIZE);
        let (items, total) = self
            .store
            .list_versions(config_id, offset(page, limit), limit)
            .await
            .map_err(map_store_error)?;
        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    /// Fetch one version of an owned document. A version id belonging to a
    /// different document reads as not found.
    pub async fn get_version(
        &self,
        user_id: DbId,
        config_id: DbId,
        version_id: DbId,
    ) -> Result<ConfigVersion, CoreError> {
        self.owned_config(user_id, config_id).await?;
        let version = self
            .store
            .get_version(version_id)
            .await
            .map_err(map_store_error)?
            .ok_or(CoreError::NotFound {
                entity: "version",
                id: version_id,
            })?;
        if version.config_id != config_id {
            return Err(CoreError::NotFound {
                entity: "version",
                id: version_id,
            });
        }
        Ok(version)
    }

    /// Restore a document to an earlier snapshot. Restoring appends a new
    /// version carrying the old content; history is never rewritten.
    pub async fn restore_version(
        &self,
        user_id: DbId,
        config_id: DbId,
        version_id: DbId,
    ) -> Result<UserConfig, CoreError> {
        self.owned_config(user_id, config_id).await?;
        let snapshot = self.get_version(user_id, config_id, version_id).await?;

        let patch = ConfigPatch {
            name: None,
            description: None,
            content: Some(snapshot.content.clone()),
            format: None,
        };
        let updated = self
            .apply_versioned_update(
                user_id,
                config_id,
                patch,
                &snapshot.content,
                restore_note(snapshot.version),
            )
            .await?;

        tracing::info!(
            user_id,
            config_id,
            restored_version = snapshot.version,
            "Configuration restored"
        );
        Ok(updated)
    }

    /// Apply a content-bearing patch together with its version snapshot.
    ///
    /// The next version number is computed optimistically; if a concurrent
    /// writer claims it first, the unique constraint fires and the number is
    /// recomputed once before giving up with a conflict.
    async fn apply_versioned_update(
        &self,
        user_id: DbId,
        config_id: DbId,
        patch: ConfigPatch,
        content: &str,
        note: String,
    ) -> Result<UserConfig, CoreError> {
        let mut next = self
            .store
            .latest_version_number(config_id)
            .await
            .map_err(map_store_error)?
            + 1;

        let mut retried = false;
        loop {
            let snapshot = NewConfigVersion {
                config_id,
                version: next,
                content: content.to_string(),
                change_note: note.clone(),
                created_by: user_id,
            };
            match self
                .store
                .update_config_with_version(config_id, &patch, &snapshot)
                .await
            {
                Ok(Some(updated)) => return Ok(updated),
                Ok(None) => {
                    return Err(CoreError::NotFound {
                        entity: "configuration",
                        id: config_id,
                    })
                }
                Err(StoreError::UniqueViolation(constraint))
                    if constraint.starts_with(VERSION_CONSTRAINT_PREFIX) =>
                {
                    if retried {
                        return Err(CoreError::Conflict(
                            "Configuration was modified concurrently, please retry".to_string(),
                        ));
                    }
                    retried = true;
                    next = self
                        .store
                        .latest_version_number(config_id)
                        .await
                        .map_err(map_store_error)?
                        + 1;
                }
                Err(other) => return Err(map_store_error(other)),
            }
        }
    }

    // ---------- Export ----------

    /// Render a document for download. When the target format matches the
    /// stored one, the content is returned verbatim (comments and layout
    /// intact); otherwise it is converted.
    pub async fn export_config(
        &self,
        user_id: DbId,
        id: DbId,
        target: Option<&str>,
    ) -> Result<ExportedConfig, CoreError> {
        let config = self.owned_config(user_id, id).await?;
        let stored = ConfigFormat::from_str(&config.format)?;
        let target = match target {
            Some(t) => ConfigFormat::from_str(t)?,
            None => stored,
        };

        let content = if target == stored {
            config.content.clone()
        } else {
            convert_format(&config.content, stored, target)?
        };

        Ok(ExportedConfig {
            filename: format!("{}.{}", config.name, target.as_str()),
            content,
            format: target,
        })
    }

    // ---------- Stateless format operations ----------

    pub fn detect(&self, content: &str) -> Result<ConfigFormat, CoreError> {
        Ok(detect_format(content)?)
    }

    pub fn convert(
        &self,
        content: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<ConvertedContent, CoreError> {
        let to = ConfigFormat::from_str(to)?;
        let from = match from {
            Some(f) => ConfigFormat::from_str(f)?,
            None => detect_format(content)?,
        };
        let converted = convert_format(content, from, to)?;
        Ok(ConvertedContent {
            content: converted,
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Validate content syntactically and, when a template is named, against
    /// its schema and declared variables.
    pub async fn validate_content(
        &self,
        content: &str,
        format: Option<&str>,
        template_id: Option<DbId>,
    ) -> Result<ValidationOutcome, CoreError> {
        let format = match format {
            Some(f) => ConfigFormat::from_str(f)?,
            None => detect_format(content)?,
        };

        let mut errors = Vec::new();
        match parse_config(content, format) {
            Err(err) => errors.push(err.to_string()),
            Ok(data) => {
                if let Some(template_id) = template_id {
                    let template = self.get_template(template_id).await?;
                    if let Some(schema) = &template.schema {
                        if let Err(err) = validate_against_schema(&data, schema) {
                            errors.push(err.to_string());
                        }
                    }
                    let variables = template
                        .declared_variables()
                        .map_err(|e| CoreError::Internal(e.to_string()))?;
                    if let Err(err) = validate_variables(&data, &variables) {
                        errors.push(err.to_string());
                    }
                }
            }
        }

        Ok(ValidationOutcome {
            valid: errors.is_empty(),
            format: format.to_string(),
            errors,
        })
    }

    // ---------- Imports ----------

    pub async fn create_import(
        &self,
        user_id: DbId,
        req: CreateImportRequest,
    ) -> Result<ConfigImport, CoreError> {
        if !is_valid_source_type(&req.source_type) {
            return Err(CoreError::Validation(format!(
                "Invalid import source type '{}'",
                req.source_type
            )));
        }
        if req.source_url.trim().is_empty() {
            return Err(CoreError::Validation(
                "Import source URL must not be empty".to_string(),
            ));
        }

        self.store
            .create_import(&NewConfigImport {
                user_id,
                source_type: req.source_type,
                source_url: req.source_url,
            })
            .await
            .map_err(map_store_error)
    }

    pub async fn get_import(&self, user_id: DbId, id: DbId) -> Result<ConfigImport, CoreError> {
        let import = self
            .store
            .get_import(id)
            .await
            .map_err(map_store_error)?
            .ok_or(CoreError::NotFound {
                entity: "import",
                id,
            })?;
        if import.user_id != user_id {
            return Err(CoreError::Forbidden(format!(
                "import {id} does not belong to user {user_id}"
            )));
        }
        Ok(import)
    }

    pub async fn list_imports(
        &self,
        user_id: DbId,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Page<ConfigImport>, CoreError> {
        let page = clamp_page(page);
        let limit = clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let (items, total) = self
            .store
            .list_imports(user_id, offset(page, limit), limit)
            .await
            .map_err(map_store_error)?;
        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    /// Advance an import through its lifecycle. Only the transitions
    /// pending -> processing -> completed | failed are allowed; terminal
    /// states are frozen. Completion stamps `completed_at`.
    pub async fn update_import_status(
        &self,
        user_id: DbId,
        id: DbId,
        req: UpdateImportRequest,
    ) -> Result<ConfigImport, CoreError> {
        let import = self.get_import(user_id, id).await?;

        if !is_valid_status(&req.status) {
            return Err(CoreError::Validation(format!(
                "Invalid import status '{}'",
                req.status
            )));
        }
        if !can_transition(&import.status, &req.status) {
            return Err(CoreError::Validation(format!(
                "Cannot transition import from '{}' to '{}'",
                import.status, req.status
            )));
        }
        if let Some(config_id) = req.config_id {
            // The resulting document must exist and belong to the importer.
            self.owned_config(user_id, config_id).await?;
        }

        let completed_at = is_terminal_status(&req.status).then(chrono::Utc::now);
        self.store
            .update_import(
                id,
                &ImportUpdate {
                    status: req.status,
                    error_message: req.error_message,
                    config_id: req.config_id,
                    completed_at,
                },
            )
            .await
            .map_err(map_store_error)?
            .ok_or(CoreError::NotFound {
                entity: "import",
                id,
            })
    }

    // ---------- Helpers ----------

    /// Fetch a document and enforce ownership. Missing ids are not found;
    /// another user's ids are forbidden (surfaced identically over HTTP).
    async fn owned_config(&self, user_id: DbId, id: DbId) -> Result<UserConfig, CoreError> {
        let config = self
            .store
            .get_config(id)
            .await
            .map_err(map_store_error)?
            .ok_or(CoreError::NotFound {
                entity: "configuration",
                id,
            })?;
        if config.user_id != user_id {
            return Err(CoreError::Forbidden(format!(
                "configuration {id} does not belong to user {user_id}"
            )));
        }
        Ok(config)
    }
}

fn ensure_schema_is_json(schema: &str) -> Result<(), CoreError> {
    serde_json::from_str::<serde_json::Value>(schema)
        .map_err(|e| CoreError::Validation(format!("Schema must be valid JSON: {e}")))?;
    Ok(())
}
