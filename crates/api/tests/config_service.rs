//! Integration tests for the configuration service, run against the
//! in-memory store so the full create/update/version/restore lifecycle is
//! exercised without a database.

use std::sync::atomic::{AtomicUsize, Ordering};

use assert_matches::assert_matches;
use async_trait::async_trait;

use conflux_api::service::{
    ConfigService, CreateConfigRequest, CreateImportRequest, UpdateConfigRequest,
    UpdateImportRequest,
};
use conflux_core::error::CoreError;
use conflux_core::template::ConfigVariable;
use conflux_core::types::DbId;
use conflux_db::models::{
    ConfigImport, ConfigTemplate, ConfigVersion, CreateTemplate, ImportUpdate, NewConfigImport,
    NewConfigVersion, NewUserConfig, UpdateTemplate, UserConfig,
};
use conflux_db::repositories::{
    ConfigPatch, ConfigStore, MemoryStore, StoreError, TemplateFilter,
};

const OWNER: i64 = 1;
const STRANGER: i64 = 2;

fn service() -> ConfigService<MemoryStore> {
    ConfigService::new(MemoryStore::new())
}

fn custom_config(name: &str, format: Option<&str>, content: &str) -> CreateConfigRequest {
    CreateConfigRequest {
        template_id: None,
        name: name.to_string(),
        description: None,
        format: format.map(str::to_string),
        content: Some(content.to_string()),
    }
}

fn content_update(content: &str, note: &str) -> UpdateConfigRequest {
    UpdateConfigRequest {
        name: None,
        description: None,
        content: Some(content.to_string()),
        format: None,
        change_note: Some(note.to_string()),
    }
}

async fn create_json_config<S: ConfigStore>(svc: &ConfigService<S>, name: &str) -> i64 {
    svc.create_config(OWNER, custom_config(name, Some("json"), "{\"a\": 1}"))
        .await
        .expect("create should succeed")
        .id
}

// ---------------------------------------------------------------------------
// Creation and versioning
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creation_records_initial_version() {
    let svc = service();
    let id = create_json_config(&svc, "app").await;

    let versions = svc.list_versions(OWNER, id, None, None).await.unwrap();
    assert_eq!(versions.total, 1);
    assert_eq!(versions.items[0].version, 1);
    assert_eq!(versions.items[0].change_note, "Initial version");
    assert_eq!(versions.items[0].content, "{\"a\": 1}");
}

#[tokio::test]
async fn version_numbers_increase_without_gaps() {
    let svc = service();
    let id = create_json_config(&svc, "app").await;

    for i in 2..=4 {
        svc.update_config(
            OWNER,
            id,
            content_update(&format!("{{\"a\": {i}}}"), "bump"),
        )
        .await
        .unwrap();
    }

    let versions = svc.list_versions(OWNER, id, None, None).await.unwrap();
    assert_eq!(versions.total, 4);
    // Newest first.
    assert_eq!(
        versions.items.iter().map(|v| v.version).collect::<Vec<_>>(),
        vec![4, 3, 2, 1]
    );
}

#[tokio::test]
async fn metadata_update_does_not_append_version() {
    let svc = service();
    let id = create_json_config(&svc, "app").await;

    let updated = svc
        .update_config(
            OWNER,
            id,
            UpdateConfigRequest {
                name: Some("renamed".to_string()),
                description: Some("prod settings".to_string()),
                content: None,
                format: None,
                change_note: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "renamed");

    let versions = svc.list_versions(OWNER, id, None, None).await.unwrap();
    assert_eq!(versions.total, 1);
}

#[tokio::test]
async fn invalid_content_leaves_document_and_history_untouched() {
    let svc = service();
    let id = create_json_config(&svc, "app").await;

    let err = svc
        .update_config(OWNER, id, content_update("{not json", "broken"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Format(_));

    let config = svc.get_config(OWNER, id).await.unwrap();
    assert_eq!(config.content, "{\"a\": 1}");
    let versions = svc.list_versions(OWNER, id, None, None).await.unwrap();
    assert_eq!(versions.total, 1);
}

#[tokio::test]
async fn duplicate_name_for_same_user_is_a_validation_error() {
    let svc = service();
    create_json_config(&svc, "app").await;

    let err = svc
        .create_config(OWNER, custom_config("app", Some("json"), "{}"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(msg) if msg.contains("already exists"));

    // A different user can reuse the name.
    svc.create_config(STRANGER, custom_config("app", Some("json"), "{}"))
        .await
        .unwrap();
}

#[tokio::test]
async fn format_is_detected_when_not_supplied() {
    let svc = service();
    let config = svc
        .create_config(OWNER, custom_config("toml-cfg", None, "[server]\nport = 8080\n"))
        .await
        .unwrap();
    assert_eq!(config.format, "toml");
}

#[tokio::test]
async fn update_can_override_the_stored_format() {
    let svc = service();
    let id = create_json_config(&svc, "app").await;

    let updated = svc
        .update_config(
            OWNER,
            id,
            UpdateConfigRequest {
                content: Some("a: 2\nb: 3\n".to_string()),
                format: Some("yaml".to_string()),
                change_note: Some("switch to yaml".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.format, "yaml");
    assert_eq!(updated.content, "a: 2\nb: 3\n");

    let versions = svc.list_versions(OWNER, id, None, None).await.unwrap();
    assert_eq!(versions.total, 2);
    assert_eq!(versions.items[0].content, "a: 2\nb: 3\n");

    // The new content is validated under the override, not the old format.
    let err = svc
        .update_config(
            OWNER,
            id,
            UpdateConfigRequest {
                content: Some("{\"a\": 1}".to_string()),
                format: Some("toml".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Format(_));
}

#[tokio::test]
async fn format_override_without_content_revalidates_stored_content() {
    let svc = service();
    let id = create_json_config(&svc, "app").await;

    // JSON is a YAML subset, so the stored content can be re-labeled.
    let updated = svc
        .update_config(
            OWNER,
            id,
            UpdateConfigRequest {
                format: Some("yaml".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.format, "yaml");

    // Re-labeling alone is a metadata change and appends no snapshot.
    let versions = svc.list_versions(OWNER, id, None, None).await.unwrap();
    assert_eq!(versions.total, 1);

    // An override the stored content cannot satisfy is rejected.
    let err = svc
        .update_config(
            OWNER,
            id,
            UpdateConfigRequest {
                format: Some("toml".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Format(_));
    let config = svc.get_config(OWNER, id).await.unwrap();
    assert_eq!(config.format, "yaml");
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn other_users_cannot_touch_a_document() {
    let svc = service();
    let id = create_json_config(&svc, "app").await;

    let err = svc.get_config(STRANGER, id).await.unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));

    let err = svc
        .update_config(STRANGER, id, content_update("{}", ""))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));

    let err = svc.delete_config(STRANGER, id).await.unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));

    let err = svc
        .list_versions(STRANGER, id, None, None)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));
}

#[tokio::test]
async fn version_from_another_document_reads_as_not_found() {
    let svc = service();
    let first = create_json_config(&svc, "first").await;
    let second = create_json_config(&svc, "second").await;

    let versions = svc.list_versions(OWNER, second, None, None).await.unwrap();
    let second_v1 = versions.items[0].id;

    let err = svc.get_version(OWNER, first, second_v1).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "version", .. });
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

#[tokio::test]
async fn restore_appends_a_new_version_with_old_content() {
    let svc = service();
    let id = create_json_config(&svc, "app").await;
    svc.update_config(OWNER, id, content_update("{\"a\": 2}", "second"))
        .await
        .unwrap();

    let versions = svc.list_versions(OWNER, id, None, None).await.unwrap();
    let v1 = versions
        .items
        .iter()
        .find(|v| v.version == 1)
        .unwrap()
        .clone();

    let restored = svc.restore_version(OWNER, id, v1.id).await.unwrap();
    assert_eq!(restored.content, "{\"a\": 1}");

    let versions = svc.list_versions(OWNER, id, None, None).await.unwrap();
    assert_eq!(versions.total, 3);
    assert_eq!(versions.items[0].version, 3);
    assert_eq!(versions.items[0].change_note, "Restored to version 1");
    assert_eq!(versions.items[0].content, "{\"a\": 1}");
    // Older snapshots are untouched.
    assert!(versions.items.iter().any(|v| v.version == 2));
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_in_stored_format_is_verbatim() {
    let svc = service();
    // Awkward spacing that a parse/serialize round trip would normalize.
    let content = "{\n    \"name\":    \"svc\"\n}";
    let config = svc
        .create_config(OWNER, custom_config("app", Some("json"), content))
        .await
        .unwrap();

    let export = svc.export_config(OWNER, config.id, None).await.unwrap();
    assert_eq!(export.content, content);
    assert_eq!(export.filename, "app.json");
}

#[tokio::test]
async fn export_converts_to_a_different_format() {
    let svc = service();
    let config = svc
        .create_config(
            OWNER,
            custom_config("app", Some("json"), "{\"name\": \"svc\"}"),
        )
        .await
        .unwrap();

    let export = svc
        .export_config(OWNER, config.id, Some("yaml"))
        .await
        .unwrap();
    assert_eq!(export.filename, "app.yaml");
    assert!(export.content.contains("name: svc"));

    let err = svc
        .export_config(OWNER, config.id, Some("ini"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Format(_));
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

fn redis_template() -> CreateTemplate {
    CreateTemplate {
        name: "redis".to_string(),
        display_name: "Redis Cache".to_string(),
        description: "Redis connection settings".to_string(),
        category: "cache".to_string(),
        format: "yaml".to_string(),
        default_content: "host: localhost\nport: 6379\n".to_string(),
        schema: None,
        variables: vec![ConfigVariable {
            name: "host".to_string(),
            path: "host".to_string(),
            var_type: "string".to_string(),
            description: String::new(),
            default_value: None,
            required: true,
            validation_rule: None,
        }],
    }
}

#[tokio::test]
async fn config_from_template_copies_content_and_format() {
    let svc = service();
    let template = svc.create_template(redis_template()).await.unwrap();

    let config = svc
        .create_config(
            OWNER,
            CreateConfigRequest {
                template_id: Some(template.id),
                name: "my-redis".to_string(),
                description: None,
                format: None,
                content: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(config.template_id, Some(template.id));
    assert_eq!(config.format, "yaml");
    assert_eq!(config.content, "host: localhost\nport: 6379\n");

    let versions = svc.list_versions(OWNER, config.id, None, None).await.unwrap();
    assert_eq!(versions.total, 1);
}

#[tokio::test]
async fn config_list_can_filter_by_source_template() {
    let svc = service();
    let template = svc.create_template(redis_template()).await.unwrap();
    let templated = svc
        .create_config(
            OWNER,
            CreateConfigRequest {
                template_id: Some(template.id),
                name: "my-redis".to_string(),
                description: None,
                format: None,
                content: None,
            },
        )
        .await
        .unwrap();
    create_json_config(&svc, "custom").await;

    let all = svc.list_configs(OWNER, None, None, None).await.unwrap();
    assert_eq!(all.total, 2);

    let filtered = svc
        .list_configs(OWNER, Some(template.id), None, None)
        .await
        .unwrap();
    assert_eq!(filtered.total, 1);
    assert_eq!(filtered.items[0].id, templated.id);

    // An unknown template id matches nothing rather than erroring.
    let none = svc.list_configs(OWNER, Some(999), None, None).await.unwrap();
    assert_eq!(none.total, 0);
}

#[tokio::test]
async fn template_with_unparseable_default_content_is_rejected() {
    let svc = service();
    let mut template = redis_template();
    template.default_content = "host: [unclosed".to_string();

    let err = svc.create_template(template).await.unwrap_err();
    assert_matches!(err, CoreError::Format(_));
}

#[tokio::test]
async fn missing_template_is_not_found() {
    let svc = service();
    let err = svc
        .create_config(
            OWNER,
            CreateConfigRequest {
                template_id: Some(999),
                name: "orphan".to_string(),
                description: None,
                format: None,
                content: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "template", .. });
}

// ---------------------------------------------------------------------------
// Validation endpoint semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_reports_problems_instead_of_failing() {
    let svc = service();

    let outcome = svc
        .validate_content("{\"a\": 1}", Some("json"), None)
        .await
        .unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.format, "json");

    let outcome = svc
        .validate_content("{broken", Some("json"), None)
        .await
        .unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.errors.len(), 1);
}

#[tokio::test]
async fn validation_checks_template_variables() {
    let svc = service();
    let template = svc.create_template(redis_template()).await.unwrap();

    // Missing the required `host` variable.
    let outcome = svc
        .validate_content("port: 6379\n", Some("yaml"), Some(template.id))
        .await
        .unwrap();
    assert!(!outcome.valid);
    assert!(outcome.errors[0].contains("host"));

    let outcome = svc
        .validate_content("host: remote\nport: 6379\n", Some("yaml"), Some(template.id))
        .await
        .unwrap();
    assert!(outcome.valid);
}

// ---------------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_lifecycle_and_transition_rules() {
    let svc = service();
    let import = svc
        .create_import(
            OWNER,
            CreateImportRequest {
                source_type: "github".to_string(),
                source_url: "https://github.com/acme/configs".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(import.status, "pending");
    assert!(import.completed_at.is_none());

    // pending -> completed skips processing and is rejected.
    let err = svc
        .update_import_status(
            OWNER,
            import.id,
            UpdateImportRequest {
                status: "completed".to_string(),
                error_message: None,
                config_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));

    let import = svc
        .update_import_status(
            OWNER,
            import.id,
            UpdateImportRequest {
                status: "processing".to_string(),
                error_message: None,
                config_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(import.status, "processing");

    let config_id = create_json_config(&svc, "imported").await;
    let import = svc
        .update_import_status(
            OWNER,
            import.id,
            UpdateImportRequest {
                status: "completed".to_string(),
                error_message: None,
                config_id: Some(config_id),
            },
        )
        .await
        .unwrap();
    assert_eq!(import.status, "completed");
    assert_eq!(import.config_id, Some(config_id));
    assert!(import.completed_at.is_some());

    // Terminal states are frozen.
    let err = svc
        .update_import_status(
            OWNER,
            import.id,
            UpdateImportRequest {
                status: "processing".to_string(),
                error_message: None,
                config_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
}

#[tokio::test]
async fn imports_are_scoped_to_their_owner() {
    let svc = service();
    let import = svc
        .create_import(
            OWNER,
            CreateImportRequest {
                source_type: "url".to_string(),
                source_url: "https://example.com/app.toml".to_string(),
            },
        )
        .await
        .unwrap();

    let err = svc.get_import(STRANGER, import.id).await.unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));

    let err = svc
        .create_import(
            OWNER,
            CreateImportRequest {
                source_type: "ftp".to_string(),
                source_url: "ftp://example.com".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn version_listing_clamps_page_size() {
    let svc = service();
    let id = create_json_config(&svc, "app").await;
    for i in 2..=15 {
        svc.update_config(
            OWNER,
            id,
            content_update(&format!("{{\"a\": {i}}}"), ""),
        )
        .await
        .unwrap();
    }

    // Default page size for versions is 10.
    let page = svc.list_versions(OWNER, id, None, None).await.unwrap();
    assert_eq!(page.limit, 10);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total, 15);

    // Out-of-range requests fall back to the default rather than the cap.
    let page = svc
        .list_versions(OWNER, id, Some(1), Some(500))
        .await
        .unwrap();
    assert_eq!(page.limit, 10);

    let page = svc.list_versions(OWNER, id, Some(2), Some(10)).await.unwrap();
    assert_eq!(page.items[0].version, 5);
}

// ---------------------------------------------------------------------------
// Concurrent version writes
// ---------------------------------------------------------------------------

/// Store wrapper that lets a rival writer claim the next version number just
/// before each of the first `contention` versioned updates, so the
/// unique-constraint recovery path can be exercised deterministically.
struct ContendedStore {
    inner: MemoryStore,
    contention: AtomicUsize,
}

impl ContendedStore {
    fn new(contention: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            contention: AtomicUsize::new(contention),
        }
    }
}

#[async_trait]
impl ConfigStore for ContendedStore {
    async fn create_template(&self, input: &CreateTemplate) -> Result<ConfigTemplate, StoreError> {
        self.inner.create_template(input).await
    }

    async fn get_template(&self, id: DbId) -> Result<Option<ConfigTemplate>, StoreError> {
        self.inner.get_template(id).await
    }

    async fn list_templates(
        &self,
        filter: &TemplateFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigTemplate>, i64), StoreError> {
        self.inner.list_templates(filter, offset, limit).await
    }

    async fn update_template(
        &self,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<ConfigTemplate>, StoreError> {
        self.inner.update_template(id, input).await
    }

    async fn delete_template(&self, id: DbId) -> Result<bool, StoreError> {
        self.inner.delete_template(id).await
    }

    async fn create_config_with_version(
        &self,
        input: &NewUserConfig,
        change_note: &str,
    ) -> Result<UserConfig, StoreError> {
        self.inner.create_config_with_version(input, change_note).await
    }

    async fn get_config(&self, id: DbId) -> Result<Option<UserConfig>, StoreError> {
        self.inner.get_config(id).await
    }

    async fn list_configs(
        &self,
        user_id: DbId,
        template_id: Option<DbId>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<UserConfig>, i64), StoreError> {
        self.inner
            .list_configs(user_id, template_id, offset, limit)
            .await
    }

    async fn update_config(
        &self,
        id: DbId,
        patch: &ConfigPatch,
    ) -> Result<Option<UserConfig>, StoreError> {
        self.inner.update_config(id, patch).await
    }

    async fn update_config_with_version(
        &self,
        id: DbId,
        patch: &ConfigPatch,
        version: &NewConfigVersion,
    ) -> Result<Option<UserConfig>, StoreError> {
        if self.contention.load(Ordering::SeqCst) > 0 {
            self.contention.fetch_sub(1, Ordering::SeqCst);
            self.inner
                .append_version(&NewConfigVersion {
                    config_id: version.config_id,
                    version: version.version,
                    content: "{\"rival\": true}".to_string(),
                    change_note: "rival write".to_string(),
                    created_by: version.created_by,
                })
                .await?;
        }
        self.inner.update_config_with_version(id, patch, version).await
    }

    async fn delete_config(&self, id: DbId) -> Result<bool, StoreError> {
        self.inner.delete_config(id).await
    }

    async fn append_version(
        &self,
        input: &NewConfigVersion,
    ) -> Result<ConfigVersion, StoreError> {
        self.inner.append_version(input).await
    }

    async fn get_version(&self, id: DbId) -> Result<Option<ConfigVersion>, StoreError> {
        self.inner.get_version(id).await
    }

    async fn list_versions(
        &self,
        config_id: DbId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigVersion>, i64), StoreError> {
        self.inner.list_versions(config_id, offset, limit).await
    }

    async fn latest_version_number(&self, config_id: DbId) -> Result<i32, StoreError> {
        self.inner.latest_version_number(config_id).await
    }

    async fn create_import(&self, input: &NewConfigImport) -> Result<ConfigImport, StoreError> {
        self.inner.create_import(input).await
    }

    async fn get_import(&self, id: DbId) -> Result<Option<ConfigImport>, StoreError> {
        self.inner.get_import(id).await
    }

    async fn list_imports(
        &self,
        user_id: DbId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConfigImport>, i64), StoreError> {
        self.inner.list_imports(user_id, offset, limit).await
    }

    async fn update_import(
        &self,
        id: DbId,
        update: &ImportUpdate,
    ) -> Result<Option<ConfigImport>, StoreError> {
        self.inner.update_import(id, update).await
    }
}

#[tokio::test]
async fn version_race_recomputes_the_number_and_succeeds() {
    let svc = ConfigService::new(ContendedStore::new(1));
    let id = create_json_config(&svc, "app").await;

    let updated = svc
        .update_config(OWNER, id, content_update("{\"a\": 2}", "mine"))
        .await
        .unwrap();
    assert_eq!(updated.content, "{\"a\": 2}");

    // Version 1 is the initial snapshot, 2 went to the rival, ours lands at 3.
    let versions = svc.list_versions(OWNER, id, None, None).await.unwrap();
    assert_eq!(versions.total, 3);
    assert_eq!(versions.items[0].version, 3);
    assert_eq!(versions.items[0].change_note, "mine");
    assert_eq!(versions.items[1].change_note, "rival write");
}

#[tokio::test]
async fn persistent_version_race_surfaces_a_conflict() {
    let svc = ConfigService::new(ContendedStore::new(2));
    let id = create_json_config(&svc, "app").await;

    let err = svc
        .update_config(OWNER, id, content_update("{\"a\": 2}", "mine"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    // The losing write leaves the document itself untouched.
    let config = svc.get_config(OWNER, id).await.unwrap();
    assert_eq!(config.content, "{\"a\": 1}");
}
