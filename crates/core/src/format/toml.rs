//! TOML codec.
//!
//! Parsing delegates to the `toml` crate. Integers parse to [`Value::Int`]
//! (64-bit) — the deliberate counterpart to the JSON codec's all-floats
//! policy, so a JSON→TOML→JSON trip can change `42.0` into `42`. TOML has
//! no null, so [`Value::Null`] fails serialization; datetimes parse to
//! their literal string form.

use indexmap::IndexMap;

use super::value::{KeyedData, Value};
use super::{ConfigFormat, FormatError};

pub fn parse(content: &str) -> Result<KeyedData, FormatError> {
    let table: ::toml::Table = content.parse().map_err(|e: ::toml::de::Error| {
        FormatError::Syntax {
            format: ConfigFormat::Toml,
            message: e.to_string(),
        }
    })?;

    Ok(table
        .into_iter()
        .map(|(key, val)| (key, from_toml(val)))
        .collect())
}

pub fn serialize(data: &KeyedData) -> Result<String, FormatError> {
    let mut table = ::toml::Table::with_capacity(data.len());
    for (key, val) in data {
        table.insert(key.clone(), to_toml(val)?);
    }
    ::toml::to_string(&table).map_err(|e| FormatError::Syntax {
        format: ConfigFormat::Toml,
        message: e.to_string(),
    })
}

fn from_toml(value: ::toml::Value) -> Value {
    match value {
        ::toml::Value::String(s) => Value::String(s),
        ::toml::Value::Integer(i) => Value::Int(i),
        ::toml::Value::Float(f) => Value::Float(f),
        ::toml::Value::Boolean(b) => Value::Bool(b),
        ::toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        ::toml::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_toml).collect())
        }
        ::toml::Value::Table(table) => Value::Map(
            table
                .into_iter()
                .map(|(key, val)| (key, from_toml(val)))
                .collect::<IndexMap<String, Value>>(),
        ),
    }
}

fn to_toml(value: &Value) -> Result<::toml::Value, FormatError> {
    Ok(match value {
        Value::Null => {
            return Err(FormatError::Unrepresentable {
                format: ConfigFormat::Toml,
                message: "null value".into(),
            })
        }
        Value::Bool(b) => ::toml::Value::Boolean(*b),
        Value::Int(i) => ::toml::Value::Integer(*i),
        Value::Float(f) => ::toml::Value::Float(*f),
        Value::String(s) => ::toml::Value::String(s.clone()),
        Value::Array(items) => {
            ::toml::Value::Array(items.iter().map(to_toml).collect::<Result<_, _>>()?)
        }
        Value::Map(map) => {
            let mut table = ::toml::Table::with_capacity(map.len());
            for (key, val) in map {
                table.insert(key.clone(), to_toml(val)?);
            }
            ::toml::Value::Table(table)
        }
    })
}
