//! JSON codec.
//!
//! Parsing delegates to `serde_json`. All JSON numbers parse to
//! [`Value::Float`] regardless of whether they are written with a decimal
//! point — this matches the platform's historical behavior and is the
//! counterpart to TOML's integer policy. Output is pretty-printed with
//! two-space indentation.

use indexmap::IndexMap;

use super::value::{KeyedData, Value};
use super::{ConfigFormat, FormatError};

pub fn parse(content: &str) -> Result<KeyedData, FormatError> {
    let root: serde_json::Value =
        serde_json::from_str(content).map_err(|e| FormatError::Syntax {
            format: ConfigFormat::Json,
            message: e.to_string(),
        })?;

    match root {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, val)| (key, from_json(val)))
            .collect()),
        _ => Err(FormatError::ExpectedMapping {
            format: ConfigFormat::Json,
        }),
    }
}

pub fn serialize(data: &KeyedData) -> Result<String, FormatError> {
    let mut map = serde_json::Map::with_capacity(data.len());
    for (key, val) in data {
        map.insert(key.clone(), to_json(val)?);
    }
    serde_json::to_string_pretty(&serde_json::Value::Object(map)).map_err(|e| {
        FormatError::Syntax {
            format: ConfigFormat::Json,
            message: e.to_string(),
        }
    })
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        // Every JSON number becomes a float, including integral literals.
        serde_json::Value::Number(n) => Value::Float(n.as_f64().unwrap_or_default()),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(key, val)| (key, from_json(val)))
                .collect::<IndexMap<String, Value>>(),
        ),
    }
}

pub(super) fn to_json(value: &Value) -> Result<serde_json::Value, FormatError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| FormatError::Unrepresentable {
                format: ConfigFormat::Json,
                message: format!("non-finite number {f}"),
            })?,
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect::<Result<_, _>>()?)
        }
        Value::Map(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, val) in map {
                out.insert(key.clone(), to_json(val)?);
            }
            serde_json::Value::Object(out)
        }
    })
}
