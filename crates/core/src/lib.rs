//! Domain logic for the Conflux configuration platform.
//!
//! This crate has no internal dependencies so it can be used by the
//! API/repository layer and any future CLI or worker tooling. It contains
//! the multi-format parsing engine (`format`), document/template/import
//! validation rules, and the shared error and pagination types.

pub mod document;
pub mod error;
pub mod format;
pub mod import;
pub mod pagination;
pub mod template;
pub mod types;
