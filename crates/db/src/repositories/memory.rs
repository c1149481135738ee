//! In-memory implementation of [`ConfigStore`] for tests.
//!
//! Enforces the same unique constraints as the PostgreSQL schema so
//! service-level tests exercise the duplicate-name and version-race paths
//! without a database.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use conflux_core::types::DbId;

use crate::models::{
    ConfigImport, ConfigTemplate, ConfigVersion, CreateTemplate, ImportUpdate, NewConfigImport,
    NewConfigVersion, NewUserConfig, UpdateTemplate, UserConfig,
};
use crate::repositories::store::{ConfigPatch, ConfigStore, StoreError, TemplateFilter};

#[derive(Default)]
struct Inner {
    next_id: DbId,
    templates: Vec<ConfigTemplate>,
    configs: Vec<UserConfig>,
    versions: Vec<ConfigVersion>,
    imports: Vec<ConfigImport>,
}

impl Inner {
    fn alloc_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn check_config_name_unique(
        &self,
        user_id: DbId,
        name: &str,
        exclude: Option<DbId>,
    ) -> Result<(), StoreError> {
        let taken = self
            .configs
            .iter()
            .any(|c| c.user_id == user_id && c.name == name && Some(c.id) != exclude);
        if taken {
            return Err(StoreError::UniqueViolation(
                "uq_user_configs_user_id_name".to_string(),
            ));
        }
        Ok(())
    }

    fn check_version_unique(&self, config_id: DbId, version: i32) -> Result<(), StoreError> {
        let taken = self
            .versions
            .iter()
            .any(|v| v.config_id == config_id && v.version == version);
        if taken {
            return Err(StoreError::UniqueViolation(
                "uq_config_versions_config_id_version".to_string(),
            ));
        }
        Ok(())
    }

    fn insert_version(&mut self, input: &NewConfigVersion) -> Result<ConfigVersion, StoreError> {
        self.check_version_unique(input.config_id, input.version)?;
        let version = ConfigVersion {
            id: self.alloc_id(),
            config_id: input.config_id,
            version: input.version,
            content: input.content.clone(),
            change_note: input.change_note.clone(),
            created_by: input.created_by,
            created_at: Utc::now(),
        };
        self.versions.push(version.clone());
        Ok(version)
    }

    fn apply_patch(config: &mut UserConfig, patch: &ConfigPatch) {
        if let Some(name) = &patch.name {
            config.name = name.clone();
        }
        if let Some(description) = &patch.description {
            config.description = description.clone();
        }
        if let Some(content) = &patch.content {
            config.content = content.clone();
        }
        if let Some(format) = &patch.format {
            config.format = format.clone();
        }
        config.updated_at = Utc::now();
    }
}

/// Store keeping all rows in process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(items: Vec<T>, offset: i64, limit: i64) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let page = items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect();
    (page, total)
}

#[async_trait]
impl ConfigStore for MemoryStore {
    // ---------- Templates ----------

    async fn create_template(&self, input: &CreateTemplate) -> Result<ConfigTemplate, StoreError> {
        let variables = serde_json::to_value(&input.variables)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut inner = self.inner.write().unwrap();
        let now = Utc::now();
        let template = ConfigTemplate {
            id: inner.alloc_id(),
            name: input.name.clone(),
            display_name: input.display_name.clone(),
            description: input.description.clone(),
            version: "1.0.0".to_string(),
            category: input.category.clone(),
            format: input.format.clone(),
            default_content: input.default_content.clone(),
            schema: input.schema.clone(),
            variables,
            created_at: now,
            updated_at: now,
        };
        inner.templates.push(template.clone());
        Ok(template)
    }

    async fn get_template(&self, id: DbId) -> Result<Option<ConfigTemplate>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.templates.iter().find(|t| t.id == id).cloned())
    }

    async fn list_templates(
        &self,
        filter: &TemplateFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigTemplate>, i64), StoreError> {
        let inner = self.inner.read().unwrap();
        let mut matches: Vec<ConfigTemplate> = inner
            .templates
            .iter()
            .filter(|t| {
                if let Some(category) = &filter.category {
                    if &t.category != category {
                        return false;
                    }
                }
                if let Some(search) = &filter.search {
                    let needle = search.to_lowercase();
                    if !t.name.to_lowercase().contains(&needle)
                        && !t.display_name.to_lowercase().contains(&needle)
                    {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.category.cmp(&b.category).then(a.name.cmp(&b.name)));
        Ok(page(matches, offset, limit))
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
        let mut inner = self.inner.write().unwrap();
        let Some(template) = inner.templates.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(display_name) = &input.display_name {
            template.display_name = display_name.clone();
        }
        if let Some(description) = &input.description {
            template.description = description.clone();
        }
        if let Some(category) = &input.category {
            template.category = category.clone();
        }
        if let Some(default_content) = &input.default_content {
            template.default_content = default_content.clone();
        }
        if let Some(schema) = &input.schema {
            template.schema = Some(schema.clone());
        }
        if let Some(vars) = variables {
            template.variables = vars;
        }
        template.updated_at = Utc::now();
        Ok(Some(template.clone()))
    }

    async fn delete_template(&self, id: DbId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.templates.len();
        inner.templates.retain(|t| t.id != id);
        if inner.templates.len() == before {
            return Ok(false);
        }
        // ON DELETE SET NULL
        for config in inner.configs.iter_mut() {
            if config.template_id == Some(id) {
                config.template_id = None;
            }
        }
        Ok(true)
    }

    // ---------- Documents ----------

    async fn create_config_with_version(
        &self,
        input: &NewUserConfig,
        change_note: &str,
    ) -> Result<UserConfig, StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner.check_config_name_unique(input.user_id, &input.name, None)?;
        let now = Utc::now();
        let config = UserConfig {
            id: inner.alloc_id(),
            user_id: input.user_id,
            template_id: input.template_id,
            name: input.name.clone(),
            description: input.description.clone(),
            format: input.format.clone(),
            content: input.content.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.insert_version(&NewConfigVersion {
            config_id: config.id,
            version: 1,
            content: input.content.clone(),
            change_note: change_note.to_string(),
            created_by: input.user_id,
        })?;
        inner.configs.push(config.clone());
        Ok(config)
    }

    async fn get_config(&self, id: DbId) -> Result<Option<UserConfig>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.configs.iter().find(|c| c.id == id).cloned())
    }

    async fn list_configs(
        &self,
        user_id: DbId,
        template_id: Option<DbId>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<UserConfig>, i64), StoreError> {
        let inner = self.inner.read().unwrap();
        let mut matches: Vec<UserConfig> = inner
            .configs
            .iter()
            .filter(|c| c.user_id == user_id)
            .filter(|c| template_id.is_none() || c.template_id == template_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(page(matches, offset, limit))
    }

    async fn update_config(
        &self,
        id: DbId,
        patch: &ConfigPatch,
    ) -> Result<Option<UserConfig>, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let Some(pos) = inner.configs.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            let user_id = inner.configs[pos].user_id;
            inner.check_config_name_unique(user_id, name, Some(id))?;
        }
        Inner::apply_patch(&mut inner.configs[pos], patch);
        Ok(Some(inner.configs[pos].clone()))
    }

    async fn update_config_with_version(
        &self,
        id: DbId,
        patch: &ConfigPatch,
        version: &NewConfigVersion,
    ) -> Result<Option<UserConfig>, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let Some(pos) = inner.configs.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            let user_id = inner.configs[pos].user_id;
            inner.check_config_name_unique(user_id, name, Some(id))?;
        }
        // Constraint check happens before the patch applies, matching the
        // all-or-nothing transaction in the Postgres store.
        inner.insert_version(version)?;
        Inner::apply_patch(&mut inner.configs[pos], patch);
        Ok(Some(inner.configs[pos].clone()))
    }

    async fn delete_config(&self, id: DbId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let before = inner.configs.len();
        inner.configs.retain(|c| c.id != id);
        if inner.configs.len() == before {
            return Ok(false);
        }
        // ON DELETE CASCADE / SET NULL
        inner.versions.retain(|v| v.config_id != id);
        for import in inner.imports.iter_mut() {
            if import.config_id == Some(id) {
                import.config_id = None;
            }
        }
        Ok(true)
    }

    // ---------- Versions ----------

    async fn append_version(
        &self,
        input: &NewConfigVersion,
    ) -> Result<ConfigVersion, StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner.insert_version(input)
    }

    async fn get_version(&self, id: DbId) -> Result<Option<ConfigVersion>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.versions.iter().find(|v| v.id == id).cloned())
    }

    async fn list_versions(
        &self,
        config_id: DbId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigVersion>, i64), StoreError> {
        let inner = self.inner.read().unwrap();
        let mut matches: Vec<ConfigVersion> = inner
            .versions
            .iter()
            .filter(|v| v.config_id == config_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(page(matches, offset, limit))
    }

    async fn latest_version_number(&self, config_id: DbId) -> Result<i32, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .versions
            .iter()
            .filter(|v| v.config_id == config_id)
            .map(|v| v.version)
            .max()
            .unwrap_or(0))
    }

    // ---------- Imports ----------

    async fn create_import(&self, input: &NewConfigImport) -> Result<ConfigImport, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let import = ConfigImport {
            id: inner.alloc_id(),
            user_id: input.user_id,
            source_type: input.source_type.clone(),
            source_url: input.source_url.clone(),
            status: conflux_core::import::STATUS_PENDING.to_string(),
            error_message: None,
            config_id: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        inner.imports.push(import.clone());
        Ok(import)
    }

    async fn get_import(&self, id: DbId) -> Result<Option<ConfigImport>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.imports.iter().find(|i| i.id == id).cloned())
    }

    async fn list_imports(
        &self,
        user_id: DbId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigImport>, i64), StoreError> {
        let inner = self.inner.read().unwrap();
        let mut matches: Vec<ConfigImport> = inner
            .imports
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(matches, offset, limit))
    }

    async fn update_import(
        &self,
        id: DbId,
        update: &ImportUpdate,
    ) -> Result<Option<ConfigImport>, StoreError> {
        let mut inner = self.inner.write().unwrap();
        let Some(import) = inner.imports.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        import.status = update.status.clone();
        if update.error_message.is_some() {
            import.error_message = update.error_message.clone();
        }
        if update.config_id.is_some() {
            import.config_id = update.config_id;
        }
        if update.completed_at.is_some() {
            import.completed_at = update.completed_at;
        }
        Ok(Some(import.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn new_config(user_id: DbId, name: &str) -> NewUserConfig {
        NewUserConfig {
            user_id,
            template_id: None,
            name: name.to_string(),
            description: String::new(),
            format: "json".to_string(),
            content: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn creation_writes_document_and_snapshot_together() {
        let store = MemoryStore::new();
        let config = store
            .create_config_with_version(&new_config(1, "app"), "Initial version")
            .await
            .unwrap();

        let (versions, total) = store.list_versions(config.id, 0, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(versions[0].version, 1);
        assert_eq!(versions[0].change_note, "Initial version");
        assert_eq!(versions[0].created_by, 1);
    }

    #[tokio::test]
    async fn duplicate_name_per_user_is_rejected() {
        let store = MemoryStore::new();
        store
            .create_config_with_version(&new_config(1, "app"), "")
            .await
            .unwrap();

        let err = store
            .create_config_with_version(&new_config(1, "app"), "")
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::UniqueViolation(c) if c.starts_with("uq_"));

        // The failed create leaves nothing behind.
        let (_, total) = store.list_configs(1, None, 0, 10).await.unwrap();
        assert_eq!(total, 1);

        // Same name for another user is fine.
        store
            .create_config_with_version(&new_config(2, "app"), "")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_version_number_is_rejected() {
        let store = MemoryStore::new();
        let config = store
            .create_config_with_version(&new_config(1, "app"), "")
            .await
            .unwrap();

        let snapshot = NewConfigVersion {
            config_id: config.id,
            version: 2,
            content: "{}".to_string(),
            change_note: String::new(),
            created_by: 1,
        };
        store.append_version(&snapshot).await.unwrap();
        let err = store.append_version(&snapshot).await.unwrap_err();
        assert_matches!(err, StoreError::UniqueViolation(_));
    }

    #[tokio::test]
    async fn update_with_version_is_atomic() {
        let store = MemoryStore::new();
        let config = store
            .create_config_with_version(&new_config(1, "app"), "")
            .await
            .unwrap();

        // Colliding version number: neither the patch nor the snapshot lands.
        let snapshot = NewConfigVersion {
            config_id: config.id,
            version: 1,
            content: "{\"a\":2}".to_string(),
            change_note: String::new(),
            created_by: 1,
        };
        let patch = ConfigPatch {
            content: Some("{\"a\":2}".to_string()),
            ..Default::default()
        };
        let err = store
            .update_config_with_version(config.id, &patch, &snapshot)
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::UniqueViolation(_));

        let unchanged = store.get_config(config.id).await.unwrap().unwrap();
        assert_eq!(unchanged.content, "{}");
        let (_, total) = store.list_versions(config.id, 0, 10).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn versions_list_newest_first() {
        let store = MemoryStore::new();
        let config = store
            .create_config_with_version(&new_config(1, "app"), "")
            .await
            .unwrap();
        for v in 2..=3 {
            store
                .append_version(&NewConfigVersion {
                    config_id: config.id,
                    version: v,
                    content: "{}".to_string(),
                    change_note: String::new(),
                    created_by: 1,
                })
                .await
                .unwrap();
        }

        let (page, total) = store.list_versions(config.id, 0, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(
            page.iter().map(|v| v.version).collect::<Vec<_>>(),
            vec![3, 2]
        );
    }

    #[tokio::test]
    async fn deleting_config_drops_its_versions() {
        let store = MemoryStore::new();
        let config = store
            .create_config_with_version(&new_config(1, "app"), "")
            .await
            .unwrap();

        assert!(store.delete_config(config.id).await.unwrap());
        let (_, total) = store.list_versions(config.id, 0, 10).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn list_configs_filters_by_template() {
        let store = MemoryStore::new();
        let mut templated = new_config(1, "from-template");
        templated.template_id = Some(42);
        store
            .create_config_with_version(&templated, "")
            .await
            .unwrap();
        store
            .create_config_with_version(&new_config(1, "custom"), "")
            .await
            .unwrap();

        let (all, total) = store.list_configs(1, None, 0, 10).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(all.len(), 2);

        let (filtered, total) = store.list_configs(1, Some(42), 0, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(filtered[0].name, "from-template");
    }

    #[tokio::test]
    async fn template_search_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .create_template(&CreateTemplate {
                name: "nginx-proxy".to_string(),
                display_name: "Nginx Reverse Proxy".to_string(),
                description: String::new(),
                category: "web".to_string(),
                format: "yaml".to_string(),
                default_content: "port: 80\n".to_string(),
                schema: None,
                variables: Vec::new(),
            })
            .await
            .unwrap();

        let filter = TemplateFilter {
            category: None,
            search: Some("NGINX".to_string()),
        };
        let (found, total) = store.list_templates(&filter, 0, 20).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].name, "nginx-proxy");

        let filter = TemplateFilter {
            category: Some("db".to_string()),
            search: None,
        };
        let (_, total) = store.list_templates(&filter, 0, 20).await.unwrap();
        assert_eq!(total, 0);
    }
}
