//! Errors raised while serializing and deserializing.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use tessera_core::{Mismatch, ReflectError};

/// Error raised by formats, boxed so the pipeline stays format-agnostic.
pub type FormatError = Box<dyn core::error::Error + Send + Sync>;

/// An error raised while serializing.
#[derive(Debug)]
pub enum SerializeError {
    /// No handler accepts this field and value.
    NoExporterFound {
        /// The field being written.
        field: String,
        /// What the value was.
        value: String,
        /// The active format.
        format: &'static str,
    },
    /// An object was reached again while it was still being written.
    CircularReferenceDetected {
        /// The object's type.
        type_name: &'static str,
    },
    /// The object graph is deeper than the configured limit.
    DepthLimitExceeded {
        /// The limit.
        limit: usize,
    },
    /// An object's type is not registered.
    UnknownType {
        /// The unregistered type.
        type_name: String,
    },
    /// A type map has no discriminator for this class.
    NoIdentifierForType {
        /// The class.
        type_name: String,
        /// The map's key field.
        key: String,
    },
    /// The value does not match the field's declared type.
    TypeMismatch {
        /// The field being written.
        field: String,
        /// What the field declares.
        expected: &'static str,
        /// What the value was.
        found: String,
    },
    /// A date format string could not be applied.
    InvalidDateFormat {
        /// The field being written.
        field: String,
        /// The offending format.
        format: String,
    },
    /// A property read failed.
    Reflect(ReflectError),
    /// The format rejected a value.
    Format(FormatError),
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::NoExporterFound {
                field,
                value,
                format,
            } => write!(f, "no exporter can write {value} field `{field}` to {format}"),
            SerializeError::CircularReferenceDetected { type_name } => {
                write!(f, "circular reference detected at {type_name}")
            }
            SerializeError::DepthLimitExceeded { limit } => {
                write!(f, "object graph is deeper than {limit} levels")
            }
            SerializeError::UnknownType { type_name } => {
                write!(f, "type {type_name} is not registered")
            }
            SerializeError::NoIdentifierForType { type_name, key } => {
                write!(f, "type map `{key}` has no identifier for {type_name}")
            }
            SerializeError::TypeMismatch {
                field,
                expected,
                found,
            } => write!(f, "field `{field}`: expected {expected}, found {found}"),
            SerializeError::InvalidDateFormat { field, format } => {
                write!(f, "field `{field}`: invalid date format `{format}`")
            }
            SerializeError::Reflect(error) => write!(f, "{error}"),
            SerializeError::Format(error) => write!(f, "{error}"),
        }
    }
}

impl core::error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            SerializeError::Reflect(error) => Some(error),
            SerializeError::Format(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl From<ReflectError> for SerializeError {
    fn from(error: ReflectError) -> Self {
        SerializeError::Reflect(error)
    }
}

/// An error raised while deserializing.
#[derive(Debug)]
pub enum DeserializeError {
    /// No handler accepts this field.
    NoImporterFound {
        /// The field being read.
        field: String,
        /// The active format.
        format: &'static str,
    },
    /// A required field had no value.
    MissingRequiredValue {
        /// The field.
        field: String,
        /// The class declaring it.
        type_name: &'static str,
    },
    /// A value does not match the field's declared type.
    TypeMismatch {
        /// The field being read.
        field: String,
        /// What the field declares.
        expected: &'static str,
        /// What the input held.
        found: &'static str,
    },
    /// A discriminator value is not in the type map.
    NoTypeMapDefinedForKey {
        /// The field being read.
        field: String,
        /// The unmapped discriminator.
        key: String,
    },
    /// A dictionary key does not fit the declared key type.
    InvalidArrayKeyType {
        /// The field being read.
        field: String,
        /// The offending key.
        key: String,
    },
    /// A type named by metadata or a type map is not registered.
    UnknownType {
        /// The unregistered type.
        type_name: String,
    },
    /// The input produced another type than the one requested.
    UnexpectedType {
        /// The requested type.
        expected: &'static str,
        /// The type produced.
        found: &'static str,
    },
    /// An enum value matches no case.
    InvalidEnumCase {
        /// The field being read.
        field: String,
        /// The enum.
        enumeration: &'static str,
        /// The input value.
        value: String,
    },
    /// A date could not be parsed.
    InvalidDate {
        /// The field being read.
        field: String,
        /// The input value.
        input: String,
    },
    /// The format cannot hand back unclaimed keys.
    CollectingUnsupported {
        /// The collecting field.
        field: String,
        /// The active format.
        format: &'static str,
    },
    /// A mixed field's type cannot be determined from the input.
    UnresolvableMixed {
        /// The field being read.
        field: String,
        /// The active format.
        format: &'static str,
    },
    /// The object graph is deeper than the configured limit.
    DepthLimitExceeded {
        /// The limit.
        limit: usize,
    },
    /// The input holds no root object.
    MissingRoot {
        /// The requested root type.
        type_name: &'static str,
    },
    /// A property write or post-load call failed.
    Reflect(ReflectError),
    /// The format could not decode its input.
    Format(FormatError),
}

impl DeserializeError {
    /// A type mismatch reported by the coercion table.
    pub fn mismatch(field: &str, mismatch: Mismatch) -> Self {
        DeserializeError::TypeMismatch {
            field: field.into(),
            expected: mismatch.expected.name(),
            found: mismatch.found.name(),
        }
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeserializeError::NoImporterFound { field, format } => {
                write!(f, "no importer can read field `{field}` from {format}")
            }
            DeserializeError::MissingRequiredValue { field, type_name } => {
                write!(f, "{type_name}.{field} requires a value")
            }
            DeserializeError::TypeMismatch {
                field,
                expected,
                found,
            } => write!(f, "field `{field}`: expected {expected}, found {found}"),
            DeserializeError::NoTypeMapDefinedForKey { field, key } => {
                write!(f, "field `{field}`: no type mapped to `{key}`")
            }
            DeserializeError::InvalidArrayKeyType { field, key } => {
                write!(f, "field `{field}`: key `{key}` is not an integer")
            }
            DeserializeError::UnknownType { type_name } => {
                write!(f, "type {type_name} is not registered")
            }
            DeserializeError::UnexpectedType { expected, found } => {
                write!(f, "expected {expected}, input produced {found}")
            }
            DeserializeError::InvalidEnumCase {
                field,
                enumeration,
                value,
            } => write!(f, "field `{field}`: `{value}` is not a case of {enumeration}"),
            DeserializeError::InvalidDate { field, input } => {
                write!(f, "field `{field}`: cannot parse `{input}` as a date")
            }
            DeserializeError::CollectingUnsupported { field, format } => {
                write!(f, "field `{field}`: {format} cannot collect unclaimed keys")
            }
            DeserializeError::UnresolvableMixed { field, format } => {
                write!(f, "field `{field}`: {format} cannot tell which type to read")
            }
            DeserializeError::DepthLimitExceeded { limit } => {
                write!(f, "input nests deeper than {limit} levels")
            }
            DeserializeError::MissingRoot { type_name } => {
                write!(f, "input holds no {type_name}")
            }
            DeserializeError::Reflect(error) => write!(f, "{error}"),
            DeserializeError::Format(error) => write!(f, "{error}"),
        }
    }
}

impl core::error::Error for DeserializeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            DeserializeError::Reflect(error) => Some(error),
            DeserializeError::Format(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl From<ReflectError> for DeserializeError {
    fn from(error: ReflectError) -> Self {
        DeserializeError::Reflect(error)
    }
}

#[cfg(feature = "pretty-errors")]
impl miette::Diagnostic for SerializeError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            SerializeError::NoExporterFound { .. } => "no_exporter_found",
            SerializeError::CircularReferenceDetected { .. } => "circular_reference_detected",
            SerializeError::DepthLimitExceeded { .. } => "depth_limit_exceeded",
            SerializeError::UnknownType { .. } => "unknown_type",
            SerializeError::NoIdentifierForType { .. } => "no_identifier_for_type",
            SerializeError::TypeMismatch { .. } => "type_mismatch",
            SerializeError::InvalidDateFormat { .. } => "invalid_date_format",
            SerializeError::Reflect(_) => "reflect",
            SerializeError::Format(_) => "format",
        };
        Some(Box::new(alloc::format!("tessera::serialize::{code}")))
    }
}

#[cfg(feature = "pretty-errors")]
impl miette::Diagnostic for DeserializeError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            DeserializeError::NoImporterFound { .. } => "no_importer_found",
            DeserializeError::MissingRequiredValue { .. } => "missing_required_value",
            DeserializeError::TypeMismatch { .. } => "type_mismatch",
            DeserializeError::NoTypeMapDefinedForKey { .. } => "no_type_map_defined_for_key",
            DeserializeError::InvalidArrayKeyType { .. } => "invalid_array_key_type",
            DeserializeError::UnknownType { .. } => "unknown_type",
            DeserializeError::UnexpectedType { .. } => "unexpected_type",
            DeserializeError::InvalidEnumCase { .. } => "invalid_enum_case",
            DeserializeError::InvalidDate { .. } => "invalid_date",
            DeserializeError::CollectingUnsupported { .. } => "collecting_unsupported",
            DeserializeError::UnresolvableMixed { .. } => "unresolvable_mixed",
            DeserializeError::DepthLimitExceeded { .. } => "depth_limit_exceeded",
            DeserializeError::MissingRoot { .. } => "missing_root",
            DeserializeError::Reflect(_) => "reflect",
            DeserializeError::Format(_) => "format",
        };
        Some(Box::new(alloc::format!("tessera::deserialize::{code}")))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self {
            DeserializeError::TypeMismatch { .. } => {
                "mark the field lenient to accept coercible values"
            }
            DeserializeError::CollectingUnsupported { .. } => {
                "collect unclaimed keys only with name-keyed formats"
            }
            DeserializeError::UnresolvableMixed { .. } => {
                "suggest a class for the mixed field"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}
