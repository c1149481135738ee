//! ENV codec — the one format without a library behind it.
//!
//! A document is a sequence of `KEY=VALUE` lines. Blank lines and lines
//! whose first non-space character is `#` are skipped. Lines split on the
//! first `=` only, so values may themselves contain `=` (query strings,
//! connection URLs). Parsed values are always strings; no type coercion.
//!
//! Serialization stringifies scalars naturally (`true`, `42`), embeds
//! composite values as compact JSON, and double-quotes any value containing
//! whitespace, quotes, a backslash, or a newline, escaping `\` and `"`.

use super::value::{KeyedData, Value};
use super::{json, FormatError};

pub fn parse(content: &str) -> Result<KeyedData, FormatError> {
    let mut data = KeyedData::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| FormatError::InvalidEnvLine(line.to_string()))?;

        data.insert(
            key.trim().to_string(),
            Value::String(unquote(value.trim()).to_string()),
        );
    }

    Ok(data)
}

pub fn serialize(data: &KeyedData) -> Result<String, FormatError> {
    let mut lines = Vec::with_capacity(data.len());

    for (key, value) in data {
        let raw = match value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            // Composite (and null) values embed as compact JSON.
            other => {
                let json = json::to_json(other)?;
                serde_json::to_string(&json).map_err(|e| FormatError::Syntax {
                    format: super::ConfigFormat::Env,
                    message: e.to_string(),
                })?
            }
        };

        lines.push(format!("{key}={}", quote_if_needed(&raw)));
    }

    Ok(lines.join("\n"))
}

/// Strip exactly one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn quote_if_needed(value: &str) -> String {
    let needs_quoting = value
        .chars()
        .any(|c| matches!(c, ' ' | '\t' | '\n' | '"' | '\'' | '\\'));

    if needs_quoting {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
