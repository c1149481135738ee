//! YAML codec.
//!
//! Parsing delegates to `serde_yaml`. Integer scalars parse to
//! [`Value::Int`], other numerics to [`Value::Float`] — pinned by test
//! because the choice is observable through format conversion. Comments are
//! accepted on parse but, like everything the generic value model cannot
//! carry, they do not survive a round-trip.

use indexmap::IndexMap;

use super::value::{KeyedData, Value};
use super::{ConfigFormat, FormatError};

pub fn parse(content: &str) -> Result<KeyedData, FormatError> {
    let root: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| FormatError::Syntax {
            format: ConfigFormat::Yaml,
            message: e.to_string(),
        })?;

    match root {
        serde_yaml::Value::Mapping(map) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (key, val) in map {
                out.insert(key_to_string(&key)?, from_yaml(val)?);
            }
            Ok(out)
        }
        _ => Err(FormatError::ExpectedMapping {
            format: ConfigFormat::Yaml,
        }),
    }
}

pub fn serialize(data: &KeyedData) -> Result<String, FormatError> {
    let mut map = serde_yaml::Mapping::with_capacity(data.len());
    for (key, val) in data {
        map.insert(serde_yaml::Value::String(key.clone()), to_yaml(val));
    }
    serde_yaml::to_string(&serde_yaml::Value::Mapping(map)).map_err(|e| FormatError::Syntax {
        format: ConfigFormat::Yaml,
        message: e.to_string(),
    })
}

/// YAML mapping keys may be any scalar; stringify the non-string ones the
/// way they were written. Composite keys are rejected.
fn key_to_string(key: &serde_yaml::Value) -> Result<String, FormatError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(FormatError::Syntax {
            format: ConfigFormat::Yaml,
            message: format!("unsupported mapping key: {other:?}"),
        }),
    }
}

fn from_yaml(value: serde_yaml::Value) -> Result<Value, FormatError> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or_default()),
        },
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(map) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (key, val) in map {
                out.insert(key_to_string(&key)?, from_yaml(val)?);
            }
            Value::Map(out)
        }
        // `!tag value` — the tag carries no meaning in the generic model.
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(i) => serde_yaml::Value::Number((*i).into()),
        Value::Float(f) => serde_yaml::Value::Number((*f).into()),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Array(items) => serde_yaml::Value::Sequence(items.iter().map(to_yaml).collect()),
        Value::Map(map) => {
            let mut out = serde_yaml::Mapping::with_capacity(map.len());
            for (key, val) in map {
                out.insert(serde_yaml::Value::String(key.clone()), to_yaml(val));
            }
            serde_yaml::Value::Mapping(out)
        }
    }
}
