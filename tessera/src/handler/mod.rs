//! Handler chains.
//!
//! Exporters turn a `(field, value)` pair into formatter calls; importers
//! turn deformatter reads back into a value. Each chain is walked in order
//! and the first handler that accepts the field wins. Custom handlers sit in
//! front of the built-ins and re-dispatch to the handlers behind them.

mod datetime;
mod dictionary;
mod enums;
pub(crate) mod native;
pub(crate) mod object;
mod scalar;
mod sequence;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use tessera_core::{
    FieldDescriptor, FieldType, Registry, ScalarKind, Value, ValueKind, coerce,
};

use crate::{
    DeserializeError, Deformatter, Deserializer, Formatter, SerializeError, Serializer,
};

/// A user-supplied exporter.
///
/// It rewrites a field and value into another pair, which is then handed to
/// the exporters behind it.
pub trait CustomExporter: Send + Sync {
    /// Name used in traces.
    fn name(&self) -> &'static str {
        "custom"
    }

    /// Whether this exporter handles the pair.
    fn can_export(&self, field: &FieldDescriptor, value: &Value, format: &str) -> bool;

    /// Rewrites the pair.
    fn export(
        &self,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<(FieldDescriptor, Value), SerializeError>;
}

/// A user-supplied importer.
///
/// It names the field to read in place of the declared one, and converts
/// what the importers behind it produced.
pub trait CustomImporter: Send + Sync {
    /// Name used in traces.
    fn name(&self) -> &'static str {
        "custom"
    }

    /// Whether this importer handles the field.
    fn can_import(&self, field: &FieldDescriptor, format: &str) -> bool;

    /// The field to read instead.
    fn read_as(&self, field: &FieldDescriptor) -> FieldDescriptor;

    /// Converts the value read into the value to store.
    fn convert(&self, field: &FieldDescriptor, value: Value) -> Result<Value, DeserializeError>;
}

/// An entry of the export chain.
#[derive(Clone)]
pub enum Exporter {
    /// Ints, floats, bools and strings.
    Scalar,
    /// Lists, optionally imploded into a string.
    Sequence,
    /// Maps, optionally imploded into a string.
    Dictionary,
    /// Dates, as formatted strings or timestamps.
    DateTime,
    /// Enum cases, by name or backing value.
    Enum,
    /// Objects that export themselves as a map.
    Native,
    /// Objects, through their class metadata.
    Object,
    /// A user exporter.
    Custom(Arc<dyn CustomExporter>),
}

impl Exporter {
    /// The built-in chain, in priority order.
    pub fn defaults() -> Vec<Exporter> {
        alloc::vec![
            Exporter::Scalar,
            Exporter::Sequence,
            Exporter::Dictionary,
            Exporter::DateTime,
            Exporter::Enum,
            Exporter::Native,
            Exporter::Object,
        ]
    }

    /// Name used in traces.
    pub fn name(&self) -> &'static str {
        match self {
            Exporter::Scalar => "scalar",
            Exporter::Sequence => "sequence",
            Exporter::Dictionary => "dictionary",
            Exporter::DateTime => "datetime",
            Exporter::Enum => "enum",
            Exporter::Native => "native",
            Exporter::Object => "object",
            Exporter::Custom(custom) => custom.name(),
        }
    }

    /// Whether this exporter handles the pair.
    pub fn can_export(
        &self,
        field: &FieldDescriptor,
        value: &Value,
        format: &str,
        registry: &Registry,
    ) -> bool {
        match self {
            Exporter::Scalar => scalar::can_export(field, value),
            Exporter::Sequence => sequence::can_export(field, value),
            Exporter::Dictionary => dictionary::can_export(field, value),
            Exporter::DateTime => datetime::can_export(value),
            Exporter::Enum => enums::can_export(value),
            Exporter::Native => native::can_export(value, registry),
            Exporter::Object => object::can_export(field, value),
            Exporter::Custom(custom) => custom.can_export(field, value, format),
        }
    }

    pub(crate) fn export<F: Formatter>(
        &self,
        serializer: &mut Serializer<'_, F>,
        running: &mut F::Running,
        field: &FieldDescriptor,
        value: &Value,
        position: usize,
    ) -> Result<(), SerializeError> {
        match self {
            Exporter::Scalar => scalar::export(serializer, running, field, value),
            Exporter::Sequence => sequence::export(serializer, running, field, value),
            Exporter::Dictionary => dictionary::export(serializer, running, field, value),
            Exporter::DateTime => datetime::export(serializer, running, field, value),
            Exporter::Enum => enums::export(serializer, running, field, value),
            Exporter::Native => native::export(serializer, running, field, value),
            Exporter::Object => object::export(serializer, running, field, value),
            Exporter::Custom(custom) => {
                let (field, value) = custom.export(field, value)?;
                serializer.dispatch(running, &field, &value, position + 1)
            }
        }
    }
}

impl fmt::Debug for Exporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An entry of the import chain.
#[derive(Clone)]
pub enum Importer {
    /// Ints, floats, bools and strings, coerced per the field's strictness.
    Scalar,
    /// Lists, optionally exploded from a string.
    Sequence,
    /// Maps, optionally exploded from a string.
    Dictionary,
    /// Dates, from formatted strings or timestamps.
    DateTime,
    /// Enum cases, by name or backing value.
    Enum,
    /// Objects that import themselves from a map.
    Native,
    /// Objects, through their class metadata.
    Object,
    /// A user importer.
    Custom(Arc<dyn CustomImporter>),
}

impl Importer {
    /// The built-in chain, in priority order.
    pub fn defaults() -> Vec<Importer> {
        alloc::vec![
            Importer::Scalar,
            Importer::Sequence,
            Importer::Dictionary,
            Importer::DateTime,
            Importer::Enum,
            Importer::Native,
            Importer::Object,
        ]
    }

    /// Name used in traces.
    pub fn name(&self) -> &'static str {
        match self {
            Importer::Scalar => "scalar",
            Importer::Sequence => "sequence",
            Importer::Dictionary => "dictionary",
            Importer::DateTime => "datetime",
            Importer::Enum => "enum",
            Importer::Native => "native",
            Importer::Object => "object",
            Importer::Custom(custom) => custom.name(),
        }
    }

    /// Whether this importer handles the field.
    pub fn can_import(&self, field: &FieldDescriptor, format: &str, registry: &Registry) -> bool {
        match self {
            Importer::Scalar => matches!(field.field_type, FieldType::Scalar(_)),
            Importer::Sequence => {
                field.field_type == FieldType::Array && field.sequence_settings().is_some()
            }
            Importer::Dictionary => {
                field.field_type == FieldType::Array && field.sequence_settings().is_none()
            }
            Importer::DateTime => field.is_date_time(),
            Importer::Enum => matches!(field.field_type, FieldType::Enum(_)),
            Importer::Native => {
                field.field_type == FieldType::Object
                    && field.type_name.is_some_and(|name| registry.is_native(name))
            }
            Importer::Object => field.field_type == FieldType::Object,
            Importer::Custom(custom) => custom.can_import(field, format),
        }
    }

    pub(crate) fn import<D: Deformatter>(
        &self,
        deserializer: &mut Deserializer<'_, D>,
        decoded: &mut D::Decoded,
        field: &FieldDescriptor,
        position: usize,
    ) -> Result<Option<Value>, DeserializeError> {
        match self {
            Importer::Scalar => scalar::import(deserializer, decoded, field),
            Importer::Sequence => sequence::import(deserializer, decoded, field),
            Importer::Dictionary => dictionary::import(deserializer, decoded, field),
            Importer::DateTime => datetime::import(deserializer, decoded, field),
            Importer::Enum => enums::import(deserializer, decoded, field),
            Importer::Native => native::import(deserializer, decoded, field),
            Importer::Object => object::import(deserializer, decoded, field),
            Importer::Custom(custom) => {
                let read = custom.read_as(field);
                match deserializer.import_from(decoded, &read, position + 1)? {
                    Some(Value::Null) => Ok(Some(Value::Null)),
                    Some(value) => custom.convert(field, value).map(Some),
                    None => Ok(None),
                }
            }
        }
    }
}

impl fmt::Debug for Importer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The scalar kind of a runtime value.
fn scalar_kind(value: &Value) -> Option<ScalarKind> {
    match value.kind() {
        ValueKind::Int => Some(ScalarKind::Int),
        ValueKind::Float => Some(ScalarKind::Float),
        ValueKind::Bool => Some(ScalarKind::Bool),
        ValueKind::String => Some(ScalarKind::String),
        _ => None,
    }
}

/// Renders a scalar for an imploded collection.
fn implode_part(field: &FieldDescriptor, value: &Value) -> Result<String, SerializeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(SerializeError::TypeMismatch {
            field: field.name.clone(),
            expected: "scalar",
            found: other.describe(),
        }),
    }
}

/// Splits an imploded string, dropping the empty string's single part.
fn explode<'s>(text: &'s str, separator: &str, trim: bool) -> Vec<&'s str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(separator)
        .map(|part| if trim { part.trim() } else { part })
        .collect()
}

/// Converts an exploded part to the element field's scalar kind.
fn explode_part(element: &FieldDescriptor, part: &str) -> Result<Value, DeserializeError> {
    let value = Value::String(part.into());
    match element.field_type {
        FieldType::Scalar(kind) => {
            coerce(value, kind, false).map_err(|m| DeserializeError::mismatch(&element.name, m))
        }
        _ => Ok(value),
    }
}

/// The raw string behind an imploded collection.
enum Imploded {
    Text(String),
    Absent,
    Null,
}

impl Imploded {
    /// The result to return when there is no text to explode.
    fn into_shortcut(self) -> Result<String, Option<Value>> {
        match self {
            Imploded::Text(text) => Ok(text),
            Imploded::Absent => Err(None),
            Imploded::Null => Err(Some(Value::Null)),
        }
    }
}

fn read_imploded<D: Deformatter>(
    deformatter: &D,
    decoded: &mut D::Decoded,
    field: &FieldDescriptor,
) -> Result<Imploded, DeserializeError> {
    match deformatter.deserialize_string(decoded, field)? {
        None => Ok(Imploded::Absent),
        Some(Value::Null) => Ok(Imploded::Null),
        Some(Value::String(text)) => Ok(Imploded::Text(text)),
        Some(other) => Err(DeserializeError::TypeMismatch {
            field: field.name.clone(),
            expected: "string",
            found: other.kind().name(),
        }),
    }
}
