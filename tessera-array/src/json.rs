//! JSON text on top of the array format.
//!
//! JSON adds nothing the [`Value`] tree cannot express, so this module only
//! converts between [`serde_json::Value`] and [`Value`]. Numbers that fit an
//! `i64` become integers, everything else a float. Object key order is kept.

#[cfg(feature = "pretty-errors")]
use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Number};
use tessera::{DeserializeError, Describe, Key, Reflect, SerializeError, Tessera, Value};

use crate::{from_value, to_value};

/// An error raised while going to or from JSON text.
#[derive(Debug)]
pub enum JsonError {
    /// The object could not be serialized.
    Serialize(SerializeError),
    /// The input could not be turned into an object.
    Deserialize(DeserializeError),
    /// The input is not valid JSON.
    Syntax(serde_json::Error),
    /// A value has no JSON form.
    Unrepresentable {
        /// What the value was.
        kind: &'static str,
    },
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonError::Serialize(error) => write!(f, "{error}"),
            JsonError::Deserialize(error) => write!(f, "{error}"),
            JsonError::Syntax(error) => write!(f, "invalid JSON: {error}"),
            JsonError::Unrepresentable { kind } => write!(f, "{kind} cannot be written as JSON"),
        }
    }
}

impl core::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            JsonError::Serialize(error) => Some(error),
            JsonError::Deserialize(error) => Some(error),
            JsonError::Syntax(error) => Some(error),
            JsonError::Unrepresentable { .. } => None,
        }
    }
}

#[cfg(feature = "pretty-errors")]
impl miette::Diagnostic for JsonError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            JsonError::Serialize(error) => miette::Diagnostic::code(error),
            JsonError::Deserialize(error) => miette::Diagnostic::code(error),
            JsonError::Syntax(_) => Some(Box::new("tessera_array::json::syntax")),
            JsonError::Unrepresentable { .. } => {
                Some(Box::new("tessera_array::json::unrepresentable"))
            }
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            JsonError::Deserialize(error) => miette::Diagnostic::help(error),
            _ => None,
        }
    }
}

impl From<SerializeError> for JsonError {
    fn from(error: SerializeError) -> Self {
        JsonError::Serialize(error)
    }
}

impl From<DeserializeError> for JsonError {
    fn from(error: DeserializeError) -> Self {
        JsonError::Deserialize(error)
    }
}

impl From<serde_json::Error> for JsonError {
    fn from(error: serde_json::Error) -> Self {
        JsonError::Syntax(error)
    }
}

/// Converts a value tree to JSON.
pub fn to_json(value: &Value) -> Result<serde_json::Value, JsonError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or(JsonError::Unrepresentable {
                kind: "non-finite float",
            })?,
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => serde_json::Value::Array(
            items.iter().map(to_json).collect::<Result<_, _>>()?,
        ),
        Value::Dict(map) => {
            let mut object = Map::with_capacity(map.len());
            for (key, value) in map {
                object.insert(key.to_name(), to_json(value)?);
            }
            serde_json::Value::Object(object)
        }
        other @ (Value::Enum(_) | Value::DateTime(_) | Value::Object(_)) => {
            return Err(JsonError::Unrepresentable {
                kind: other.kind().name(),
            });
        }
    })
}

/// Converts JSON to a value tree.
pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(object) => Value::Dict(
            object
                .into_iter()
                .map(|(key, value)| (Key::String(key), from_json(value)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

/// Serializes an object to a compact JSON string.
pub fn to_string(tessera: &Tessera, object: &dyn Reflect) -> Result<String, JsonError> {
    let json = to_json(&to_value(tessera, object)?)?;
    Ok(serde_json::to_string(&json)?)
}

/// Serializes an object to an indented JSON string.
pub fn to_string_pretty(tessera: &Tessera, object: &dyn Reflect) -> Result<String, JsonError> {
    let json = to_json(&to_value(tessera, object)?)?;
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Deserializes an object of type `T` from a JSON string.
pub fn from_str<T: Describe>(tessera: &Tessera, input: &str) -> Result<T, JsonError> {
    let json: serde_json::Value = serde_json::from_str(input)?;
    Ok(from_value(tessera, from_json(json))?)
}
