//! Template variable declarations and their validation against parsed
//! configuration content.
//!
//! A template may declare named variables that point into the document via
//! a dot-separated path (`server.port`). Required variables must resolve;
//! string values with a `validation_rule` must match that regex.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::format::{KeyedData, Value};

pub const TYPE_STRING: &str = "string";
pub const TYPE_NUMBER: &str = "number";
pub const TYPE_BOOLEAN: &str = "boolean";
pub const TYPE_ARRAY: &str = "array";

/// All valid variable types.
pub const VALID_VARIABLE_TYPES: &[&str] = &[TYPE_STRING, TYPE_NUMBER, TYPE_BOOLEAN, TYPE_ARRAY];

/// A variable declared by a configuration template.
///
/// Stored on the template row as a JSONB array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigVariable {
    /// Display name, e.g. `"DELAY"`.
    pub name: String,
    /// Dot-separated path into the parsed document, e.g. `"server.delay"`.
    pub path: String,
    /// One of [`VALID_VARIABLE_TYPES`].
    #[serde(rename = "type")]
    pub var_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Optional regex constraint applied to string values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rule: Option<String>,
}

/// Validate a variable declaration itself (shape, not content).
pub fn validate_variable(var: &ConfigVariable) -> Result<(), CoreError> {
    if var.name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Variable name must not be empty".into(),
        ));
    }
    if var.path.trim().is_empty() {
        return Err(CoreError::Validation(format!(
            "Variable '{}' must declare a path",
            var.name
        )));
    }
    if !VALID_VARIABLE_TYPES.contains(&var.var_type.as_str()) {
        return Err(CoreError::Validation(format!(
            "Variable '{}' has invalid type '{}'. Valid types: {}",
            var.name,
            var.var_type,
            VALID_VARIABLE_TYPES.join(", ")
        )));
    }
    if let Some(rule) = &var.validation_rule {
        Regex::new(rule).map_err(|e| {
            CoreError::Validation(format!(
                "Variable '{}' has an invalid validation rule: {e}",
                var.name
            ))
        })?;
    }
    Ok(())
}

/// Resolve a dot-separated path within parsed configuration data.
pub fn lookup_path<'a>(data: &'a KeyedData, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = data.get(segments.next()?)?;

    for segment in segments {
        match current {
            Value::Map(map) => current = map.get(segment)?,
            _ => return None,
        }
    }

    Some(current)
}

/// Validate parsed content against a template's declared variables.
pub fn validate_variables(data: &KeyedData, variables: &[ConfigVariable]) -> Result<(), CoreError> {
    for var in variables {
        let value = lookup_path(data, &var.path);

        match value {
            None => {
                if var.required && var.default_value.is_none() {
                    return Err(CoreError::Validation(format!(
                        "Required variable '{}' is missing at path '{}'",
                        var.name, var.path
                    )));
                }
            }
            Some(value) => {
                if let (Some(rule), Some(s)) = (&var.validation_rule, value.as_str()) {
                    let re = Regex::new(rule).map_err(|e| {
                        CoreError::Validation(format!(
                            "Variable '{}' has an invalid validation rule: {e}",
                            var.name
                        ))
                    })?;
                    if !re.is_match(s) {
                        return Err(CoreError::Validation(format!(
                            "Variable '{}' value '{s}' does not match rule '{rule}'",
                            var.name
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{parse_config, ConfigFormat};

    fn var(name: &str, path: &str, required: bool, rule: Option<&str>) -> ConfigVariable {
        ConfigVariable {
            name: name.into(),
            path: path.into(),
            var_type: TYPE_STRING.into(),
            description: String::new(),
            default_value: None,
            required,
            validation_rule: rule.map(Into::into),
        }
    }

    #[test]
    fn lookup_nested_path() {
        let data = parse_config("server:\n  host: localhost\n", ConfigFormat::Yaml).unwrap();
        assert_eq!(
            lookup_path(&data, "server.host"),
            Some(&Value::from("localhost"))
        );
        assert_eq!(lookup_path(&data, "server.port"), None);
        assert_eq!(lookup_path(&data, "server.host.deeper"), None);
    }

    #[test]
    fn required_variable_missing_rejected() {
        let data = parse_config("other: 1\n", ConfigFormat::Yaml).unwrap();
        let vars = [var("HOST", "server.host", true, None)];
        assert!(validate_variables(&data, &vars).is_err());
    }

    #[test]
    fn optional_variable_missing_ok() {
        let data = parse_config("other: 1\n", ConfigFormat::Yaml).unwrap();
        let vars = [var("HOST", "server.host", false, None)];
        assert!(validate_variables(&data, &vars).is_ok());
    }

    #[test]
    fn validation_rule_applied_to_strings() {
        let data = parse_config("port: \"8080\"\n", ConfigFormat::Yaml).unwrap();
        let ok = [var("PORT", "port", true, Some(r"^\d+$"))];
        assert!(validate_variables(&data, &ok).is_ok());

        let data = parse_config("port: \"eight\"\n", ConfigFormat::Yaml).unwrap();
        assert!(validate_variables(&data, &ok).is_err());
    }

    #[test]
    fn invalid_declaration_rejected() {
        let mut bad = var("X", "x", false, None);
        bad.var_type = "tuple".into();
        assert!(validate_variable(&bad).is_err());

        let bad_rule = var("X", "x", false, Some("["));
        assert!(validate_variable(&bad_rule).is_err());
    }
}
