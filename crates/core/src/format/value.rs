//! Generic, format-agnostic representation of parsed configuration content.
//!
//! Every codec parses into [`KeyedData`] and serializes back out of it. The
//! variant split between [`Value::Int`] and [`Value::Float`] is deliberate:
//! the numeric type a codec yields is part of its contract (TOML integers
//! stay 64-bit integers, JSON numbers are always floats), and hiding that
//! behind a single number type would mask real cross-format lossiness.

use indexmap::IndexMap;

/// Top-level parse result: an insertion-ordered string-keyed mapping.
pub type KeyedData = IndexMap<String, Value>;

/// A dynamically-typed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Borrow the inner string if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Int`] and [`Value::Float`].
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// A short lowercase name for the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "object",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
