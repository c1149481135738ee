//! Minimal JSON-schema evaluation for template validation.
//!
//! Only the subset templates actually use is evaluated: top-level
//! `required` keys and `properties.<key>.type` checks. Anything else in the
//! schema document is ignored. Full draft evaluation is an acknowledged
//! gap, not an error.

use crate::error::CoreError;

use super::value::{KeyedData, Value};

pub fn validate_against_schema(data: &KeyedData, schema: &str) -> Result<(), CoreError> {
    let schema: serde_json::Value = serde_json::from_str(schema)
        .map_err(|e| CoreError::Validation(format!("Schema is not valid JSON: {e}")))?;

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for key in required.iter().filter_map(|k| k.as_str()) {
            if !data.contains_key(key) {
                return Err(CoreError::Validation(format!(
                    "Missing required key '{key}'"
                )));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
        for (key, prop) in properties {
            let Some(expected) = prop.get("type").and_then(|t| t.as_str()) else {
                continue;
            };
            if let Some(value) = data.get(key) {
                if !type_matches(value, expected) {
                    return Err(CoreError::Validation(format!(
                        "Key '{key}' should be of type {expected}, got {}",
                        value.kind()
                    )));
                }
            }
        }
    }

    Ok(())
}

fn type_matches(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => matches!(value, Value::String(_)),
        "number" | "integer" => value.is_number(),
        "boolean" => matches!(value, Value::Bool(_)),
        "array" => matches!(value, Value::Array(_)),
        "object" => matches!(value, Value::Map(_)),
        "null" => matches!(value, Value::Null),
        // Unknown type names are not enforced.
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> KeyedData {
        let mut d = KeyedData::new();
        d.insert("host".into(), Value::from("localhost"));
        d.insert("port".into(), Value::Int(5432));
        d
    }

    #[test]
    fn required_keys_present() {
        let schema = r#"{"required": ["host", "port"]}"#;
        assert!(validate_against_schema(&data(), schema).is_ok());
    }

    #[test]
    fn missing_required_key_rejected() {
        let schema = r#"{"required": ["host", "password"]}"#;
        let err = validate_against_schema(&data(), schema).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn property_type_mismatch_rejected() {
        let schema = r#"{"properties": {"port": {"type": "string"}}}"#;
        assert!(validate_against_schema(&data(), schema).is_err());
    }

    #[test]
    fn property_types_enforced_only_when_present() {
        let schema = r#"{"properties": {"absent": {"type": "boolean"}}}"#;
        assert!(validate_against_schema(&data(), schema).is_ok());
    }

    #[test]
    fn invalid_schema_json_rejected() {
        let err = validate_against_schema(&data(), "{not json").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
