//! PostgreSQL implementation of [`ConfigStore`] backed by sqlx.

use async_trait::async_trait;
use conflux_core::types::DbId;
use sqlx::PgPool;

use crate::models::{
    ConfigImport, ConfigTemplate, ConfigVersion, CreateTemplate, ImportUpdate, NewConfigImport,
    NewConfigVersion, NewUserConfig, UpdateTemplate, UserConfig,
};
use crate::repositories::store::{ConfigPatch, ConfigStore, StoreError, TemplateFilter};

/// Column list for config_templates queries.
const TEMPLATE_COLUMNS: &str = "id, name, display_name, description, version, category, format, \
                                default_content, schema, variables, created_at, updated_at";

/// Column list for user_configs queries.
const CONFIG_COLUMNS: &str =
    "id, user_id, template_id, name, description, format, content, created_at, updated_at";

/// Column list for config_versions queries.
const VERSION_COLUMNS: &str =
    "id, config_id, version, content, change_note, created_by, created_at";

/// Column list for config_imports queries.
const IMPORT_COLUMNS: &str = "id, user_id, source_type, source_url, status, error_message, \
                              config_id, created_at, completed_at";

/// Store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ConfigStore for PgStore {
    // ---------- Templates ----------

    async fn create_template(&self, input: &CreateTemplate) -> Result<ConfigTemplate, StoreError> {
        let variables = serde_json::to_value(&input.variables)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let query = format!(
            "INSERT INTO config_templates
                 (name, display_name, description, category, format, default_content, schema, variables)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {TEMPLATE_COLUMNS}"
        );
        let template = sqlx::query_as::<_, ConfigTemplate>(&query)
            .bind(&input.name)
            .bind(&input.display_name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.format)
            .bind(&input.default_content)
            .bind(&input.schema)
            .bind(variables)
            .fetch_one(&self.pool)
            .await?;
        Ok(template)
    }

    async fn get_template(&self, id: DbId) -> Result<Option<ConfigTemplate>, StoreError> {
        let query = format!("SELECT {TEMPLATE_COLUMNS} FROM config_templates WHERE id = $1");
        let template = sqlx::query_as::<_, ConfigTemplate>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(template)
    }

    async fn list_templates(
        &self,
        filter: &TemplateFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigTemplate>, i64), StoreError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut next_param = 0;
        if filter.category.is_some() {
            next_param += 1;
            conditions.push(format!("category = ${next_param}"));
        }
        if filter.search.is_some() {
            next_param += 1;
            conditions.push(format!(
                "(name ILIKE ${next_param} OR display_name ILIKE ${next_param})"
            ));
        }
        let where_sql = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let search_pattern = filter.search.as_ref().map(|s| format!("%{s}%"));

        let count_query = format!("SELECT COUNT(*) FROM config_templates {where_sql}");
        let mut count = sqlx::query_as::<_, (i64,)>(&count_query);
        if let Some(category) = &filter.category {
            count = count.bind(category);
        }
        if let Some(pattern) = &search_pattern {
            count = count.bind(pattern);
        }
        let (total,) = count.fetch_one(&self.pool).await?;

        let list_query = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM config_templates {where_sql}
             ORDER BY category, name
             LIMIT ${} OFFSET ${}",
            next_param + 1,
            next_param + 2
        );
        let mut rows = sqlx::query_as::<_, ConfigTemplate>(&list_query);
        if let Some(category) = &filter.category {
            rows = rows.bind(category);
        }
        if let Some(pattern) = &search_pattern {
            rows = rows.bind(pattern);
        }
        let templates = rows.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((templates, total))
    }

    async fn update_template(
        &self,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<ConfigTemplate>, StoreError> {
        let variables = match &input.variables {
            Some(vars) => Some(
                serde_json::to_value(vars).map_err(|e| StoreError::Backend(e.to_string()))?,
            ),
            None => None,
        };
        let query = format!(
            "UPDATE config_templates SET
                 display_name = COALESCE($2, display_name),
                 description = COALESCE($3, description),
                 category = COALESCE($4, category),
                 default_content = COALESCE($5, default_content),
                 schema = COALESCE($6, schema),
                 variables = COALESCE($7, variables),
                 updated_at = now()
             WHERE id = $1
             RETURNING {TEMPLATE_COLUMNS}"
        );
        let template = sqlx::query_as::<_, ConfigTemplate>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.default_content)
            .bind(&input.schema)
            .bind(variables)
            .fetch_optional(&self.pool)
            .await?;
        Ok(template)
    }

    async fn delete_template(&self, id: DbId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM config_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---------- Documents ----------

    async fn create_config_with_version(
        &self,
        input: &NewUserConfig,
        change_note: &str,
    ) -> Result<UserConfig, StoreError> {
        let mut tx = self.pool.begin().await?;

        let insert_config = format!(
            "INSERT INTO user_configs (user_id, template_id, name, description, format, content)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CONFIG_COLUMNS}"
        );
        let config = sqlx::query_as::<_, UserConfig>(&insert_config)
            .bind(input.user_id)
            .bind(input.template_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.format)
            .bind(&input.content)
            .fetch_one(&mut *tx)
            .await?;

        let insert_version = format!(
            "INSERT INTO config_versions (config_id, version, content, change_note, created_by)
             VALUES ($1, 1, $2, $3, $4)
             RETURNING {VERSION_COLUMNS}"
        );
        sqlx::query_as::<_, ConfigVersion>(&insert_version)
            .bind(config.id)
            .bind(&input.content)
            .bind(change_note)
            .bind(input.user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(config)
    }

    async fn get_config(&self, id: DbId) -> Result<Option<UserConfig>, StoreError> {
        let query = format!("SELECT {CONFIG_COLUMNS} FROM user_configs WHERE id = $1");
        let config = sqlx::query_as::<_, UserConfig>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(config)
    }

    async fn list_configs(
        &self,
        user_id: DbId,
        template_id: Option<DbId>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<UserConfig>, i64), StoreError> {
        let (total,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM user_configs
             WHERE user_id = $1 AND ($2::BIGINT IS NULL OR template_id = $2)",
        )
        .bind(user_id)
        .bind(template_id)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            "SELECT {CONFIG_COLUMNS} FROM user_configs
             WHERE user_id = $1 AND ($2::BIGINT IS NULL OR template_id = $2)
             ORDER BY updated_at DESC
             LIMIT $3 OFFSET $4"
        );
        let configs = sqlx::query_as::<_, UserConfig>(&query)
            .bind(user_id)
            .bind(template_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((configs, total))
    }

    async fn update_config(
        &self,
        id: DbId,
        patch: &ConfigPatch,
    ) -> Result<Option<UserConfig>, StoreError> {
        let query = format!(
            "UPDATE user_configs SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 content = COALESCE($4, content),
                 format = COALESCE($5, format),
                 updated_at = now()
             WHERE id = $1
             RETURNING {CONFIG_COLUMNS}"
        );
        let config = sqlx::query_as::<_, UserConfig>(&query)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.description)
            .bind(&patch.content)
            .bind(&patch.format)
            .fetch_optional(&self.pool)
            .await?;
        Ok(config)
    }

    async fn update_config_with_version(
        &self,
        id: DbId,
        patch: &ConfigPatch,
        version: &NewConfigVersion,
    ) -> Result<Option<UserConfig>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let update_query = format!(
            "UPDATE user_configs SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 content = COALESCE($4, content),
                 format = COALESCE($5, format),
                 updated_at = now()
             WHERE id = $1
             RETURNING {CONFIG_COLUMNS}"
        );
        let config = sqlx::query_as::<_, UserConfig>(&update_query)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.description)
            .bind(&patch.content)
            .bind(&patch.format)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(config) = config else {
            tx.rollback().await?;
            return Ok(None);
        };

        let insert_query = format!(
            "INSERT INTO config_versions (config_id, version, content, change_note, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {VERSION_COLUMNS}"
        );
        sqlx::query_as::<_, ConfigVersion>(&insert_query)
            .bind(version.config_id)
            .bind(version.version)
            .bind(&version.content)
            .bind(&version.change_note)
            .bind(version.created_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(config))
    }

    async fn delete_config(&self, id: DbId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM user_configs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---------- Versions ----------

    async fn append_version(
        &self,
        input: &NewConfigVersion,
    ) -> Result<ConfigVersion, StoreError> {
        let query = format!(
            "INSERT INTO config_versions (config_id, version, content, change_note, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {VERSION_COLUMNS}"
        );
        let version = sqlx::query_as::<_, ConfigVersion>(&query)
            .bind(input.config_id)
            .bind(input.version)
            .bind(&input.content)
            .bind(&input.change_note)
            .bind(input.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    async fn get_version(&self, id: DbId) -> Result<Option<ConfigVersion>, StoreError> {
        let query = format!("SELECT {VERSION_COLUMNS} FROM config_versions WHERE id = $1");
        let version = sqlx::query_as::<_, ConfigVersion>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(version)
    }

    async fn list_versions(
        &self,
        config_id: DbId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigVersion>, i64), StoreError> {
        let (total,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM config_versions WHERE config_id = $1",
        )
        .bind(config_id)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            "SELECT {VERSION_COLUMNS} FROM config_versions
             WHERE config_id = $1
             ORDER BY version DESC
             LIMIT $2 OFFSET $3"
        );
        let versions = sqlx::query_as::<_, ConfigVersion>(&query)
            .bind(config_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((versions, total))
    }

    async fn latest_version_number(&self, config_id: DbId) -> Result<i32, StoreError> {
        let (latest,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version), 0) FROM config_versions WHERE config_id = $1",
        )
        .bind(config_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(latest)
    }

    // ---------- Imports ----------

    async fn create_import(&self, input: &NewConfigImport) -> Result<ConfigImport, StoreError> {
        let query = format!(
            "INSERT INTO config_imports (user_id, source_type, source_url)
             VALUES ($1, $2, $3)
             RETURNING {IMPORT_COLUMNS}"
        );
        let import = sqlx::query_as::<_, ConfigImport>(&query)
            .bind(input.user_id)
            .bind(&input.source_type)
            .bind(&input.source_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(import)
    }

    async fn get_import(&self, id: DbId) -> Result<Option<ConfigImport>, StoreError> {
        let query = format!("SELECT {IMPORT_COLUMNS} FROM config_imports WHERE id = $1");
        let import = sqlx::query_as::<_, ConfigImport>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(import)
    }

    async fn list_imports(
        &self,
        user_id: DbId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigImport>, i64), StoreError> {
        let (total,) =
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM config_imports WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let query = format!(
            "SELECT {IMPORT_COLUMNS} FROM config_imports
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        let imports = sqlx::query_as::<_, ConfigImport>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((imports, total))
    }

    async fn update_import(
        &self,
        id: DbId,
        update: &ImportUpdate,
    ) -> Result<Option<ConfigImport>, StoreError> {
        let query = format!(
            "UPDATE config_imports SET
                 status = $2,
                 error_message = COALESCE($3, error_message),
                 config_id = COALESCE($4, config_id),
                 completed_at = COALESCE($5, completed_at)
             WHERE id = $1
             RETURNING {IMPORT_COLUMNS}"
        );
        let import = sqlx::query_as::<_, ConfigImport>(&query)
            .bind(id)
            .bind(&update.status)
            .bind(&update.error_message)
            .bind(update.config_id)
            .bind(update.completed_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(import)
    }
}
