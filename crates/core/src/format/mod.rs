//! Multi-format configuration engine: codecs, detection, conversion, and
//! validation for JSON, YAML, TOML, and ENV content.
//!
//! The free functions at this level are the facade the document service
//! programs against; the per-format modules stay private.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

mod detect;
mod env;
mod json;
mod schema;
mod toml;
mod value;
mod yaml;

pub use detect::detect_format;
pub use schema::validate_against_schema;
pub use value::{KeyedData, Value};

// ---------------------------------------------------------------------------
// Format discriminator
// ---------------------------------------------------------------------------

/// The serialization formats the platform understands.
///
/// Stored and transmitted as a lowercase string (`"json"`, `"yaml"`,
/// `"toml"`, `"env"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
    Env,
}

impl ConfigFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Env => "env",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ConfigFormat::Json),
            "yaml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "env" => Ok(ConfigFormat::Env),
            other => Err(FormatError::Unsupported(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A codec-level failure. Always returned, never a panic; the caller
/// decides the user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("unsupported format: {0}")]
    Unsupported(String),

    #[error("invalid {format} syntax: {message}")]
    Syntax {
        format: ConfigFormat,
        message: String,
    },

    #[error("invalid env line: {0}")]
    InvalidEnvLine(String),

    #[error("{format} document must have a top-level mapping")]
    ExpectedMapping { format: ConfigFormat },

    #[error("value not representable in {format}: {message}")]
    Unrepresentable {
        format: ConfigFormat,
        message: String,
    },
}

/// Why auto-detection failed.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("empty content")]
    EmptyContent,

    #[error("unable to detect configuration format")]
    Unrecognized,
}

// ---------------------------------------------------------------------------
// Parser facade
// ---------------------------------------------------------------------------

/// Parse `content` under the given format into the generic value model.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<KeyedData, FormatError> {
    match format {
        ConfigFormat::Json => self::json::parse(content),
        ConfigFormat::Yaml => self::yaml::parse(content),
        ConfigFormat::Toml => self::toml::parse(content),
        ConfigFormat::Env => self::env::parse(content),
    }
}

/// Serialize the generic value model to text in the given format.
pub fn serialize_config(data: &KeyedData, format: ConfigFormat) -> Result<String, FormatError> {
    match format {
        ConfigFormat::Json => self::json::serialize(data),
        ConfigFormat::Yaml => self::yaml::serialize(data),
        ConfigFormat::Toml => self::toml::serialize(data),
        ConfigFormat::Env => self::env::serialize(data),
    }
}

/// Convert text from one format to another by parsing and re-serializing.
///
/// Not information-preserving: the numeric policies differ per codec (JSON
/// `42.0` becomes TOML `42`), comments are dropped, ENV flattens everything
/// to strings. Documented lossiness, not an error.
pub fn convert_format(
    content: &str,
    from: ConfigFormat,
    to: ConfigFormat,
) -> Result<String, FormatError> {
    let data = parse_config(content, from)?;
    serialize_config(&data, to)
}

/// Validate that `content` parses under `format`, and against a JSON
/// schema when one is supplied.
pub fn validate_config(
    content: &str,
    format: ConfigFormat,
    schema: Option<&str>,
) -> Result<(), CoreError> {
    let data = parse_config(content, format)?;

    if let Some(schema) = schema {
        schema::validate_against_schema(&data, schema)?;
    }

    Ok(())
}
