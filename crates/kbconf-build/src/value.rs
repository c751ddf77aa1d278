//! Parameter values and their C initializer rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// A scalar literal taken verbatim from the manifest.
///
/// Integers, floats and strings are all emitted without quoting, so a
/// string such as `"KC_ESC"` or `"0xAB50"` becomes a bare C token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::UInt(n) => write!(f, "{n}"),
            Literal::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{x:.1}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_string())
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Int(n)
    }
}

/// The value of a definition or linker symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integer, rendered in decimal.
    Number(i128),
    /// Token rendered verbatim (identifiers, manifest literals).
    Ident(String),
    /// C string literal, rendered quoted.
    Str(String),
    /// Array initializer: `{a, b, c}`.
    Array(Vec<Value>),
    /// Struct initializer with designated fields: `{.a = 1, .b = 2}`.
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// A bare token.
    pub fn ident(s: impl Into<String>) -> Self {
        Value::Ident(s.into())
    }

    /// A quoted C string.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// An array of anything convertible to a value.
    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Convert a JSON value from the manifest.
    ///
    /// Objects become struct initializers (in manifest order) and arrays
    /// become array initializers. `null` has no C spelling and is rejected.
    pub fn from_json(field: &str, json: &serde_json::Value) -> Result<Self, CompileError> {
        use serde_json::Value as Json;

        Ok(match json {
            Json::Null => {
                return Err(CompileError::UnsupportedValue {
                    field: field.to_string(),
                    kind: "null",
                })
            }
            Json::Bool(b) => Value::ident(b.to_string()),
            Json::Number(n) => Value::ident(n.to_string()),
            Json::String(s) => Value::ident(s.as_str()),
            Json::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| Value::from_json(&format!("{field}[{i}]"), v))
                    .collect::<Result<_, _>>()?,
            ),
            Json::Object(map) => Value::Struct(
                map.iter()
                    .map(|(k, v)| -> Result<(String, Value), CompileError> {
                        Ok((k.clone(), Value::from_json(&format!("{field}.{k}"), v)?))
                    })
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Number(n as i128)
            }
        })*
    };
}

number_from!(u8, u16, u32, u64, usize, i64);

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Int(n) => Value::Number(*n as i128),
            Literal::UInt(n) => Value::Number(*n as i128),
            other => Value::Ident(other.to_string()),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl<T> From<&Vec<T>> for Value
where
    for<'a> &'a T: Into<Value>,
{
    fn from(items: &Vec<T>) -> Self {
        Value::Array(items.iter().map(Into::into).collect())
    }
}

fn write_joined<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut each: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_str("{")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        each(f, item)?;
    }
    f.write_str("}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Ident(s) => f.write_str(s),
            Value::Str(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Value::Array(items) => write_joined(f, items, |f, v| write!(f, "{v}")),
            Value::Struct(fields) => {
                write_joined(f, fields, |f, (name, v)| write!(f, ".{name} = {v}"))
            }
        }
    }
}
