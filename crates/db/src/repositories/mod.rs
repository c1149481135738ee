//! Persistence contract and its implementations.

mod memory;
mod postgres;
mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{ConfigPatch, ConfigStore, StoreError, TemplateFilter};
