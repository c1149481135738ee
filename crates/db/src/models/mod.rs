//! Row models mapped with `sqlx::FromRow`, plus create/update DTOs.

mod config_import;
mod config_version;
mod template;
mod user_config;

pub use config_import::{ConfigImport, ImportUpdate, NewConfigImport};
pub use config_version::{ConfigVersion, NewConfigVersion};
pub use template::{ConfigTemplate, CreateTemplate, UpdateTemplate};
pub use user_config::{NewUserConfig, UserConfig};
