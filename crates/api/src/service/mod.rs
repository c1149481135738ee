//! Domain service layer sitting between HTTP handlers and the store.

mod config_service;

pub use config_service::{
    ConfigService, ConvertedContent, CreateConfigRequest, CreateImportRequest, ExportedConfig,
    Page, UpdateConfigRequest, UpdateImportRequest, ValidationOutcome,
};
