pub mod configs;
pub mod formats;
pub mod imports;
pub mod templates;
