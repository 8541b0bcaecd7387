//! Errors raised while describing and reflecting types.

use alloc::string::String;
use core::fmt;

use crate::FieldType;

/// An error raised while building or registering metadata.
///
/// Schema errors are detected once, when a class is registered, so that the
/// serializer and deserializer never have to second-guess a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// An object or enum field does not name its type.
    MissingTypeName {
        /// Class declaring the field.
        class: &'static str,
        /// Offending field.
        field: String,
    },
    /// Only object and array fields can be flattened.
    InvalidFlatten {
        /// Class declaring the field.
        class: &'static str,
        /// Offending field.
        field: String,
        /// The category the field was declared with.
        field_type: FieldType,
    },
    /// A type refinement was attached to a field of the wrong category.
    IncompatibleRefinement {
        /// Class declaring the field.
        class: &'static str,
        /// Offending field.
        field: String,
        /// Name of the refinement.
        refinement: &'static str,
        /// The category the field was declared with.
        field_type: FieldType,
    },
    /// Two fields of one class share a serialized name.
    DuplicateSerializedName {
        /// Class declaring the fields.
        class: &'static str,
        /// The repeated name.
        name: String,
    },
    /// Two fields of one class pin the same field number.
    DuplicateFieldNumber {
        /// Class declaring the fields.
        class: &'static str,
        /// The repeated number.
        number: u32,
    },
    /// `Describe::describe` returned a descriptor for another type.
    TypeNameMismatch {
        /// Name the type reports through `Reflect::type_name`.
        declared: &'static str,
        /// Name found in the descriptor.
        described: &'static str,
    },
    /// An enum case is missing its backing value, or has one of the wrong kind.
    InvalidEnumBacking {
        /// The enum.
        enumeration: &'static str,
        /// The offending case.
        case: &'static str,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingTypeName { class, field } => {
                write!(f, "{class}.{field}: object and enum fields must name their type")
            }
            SchemaError::InvalidFlatten {
                class,
                field,
                field_type,
            } => write!(
                f,
                "{class}.{field}: cannot flatten a field of type {}",
                field_type.name()
            ),
            SchemaError::IncompatibleRefinement {
                class,
                field,
                refinement,
                field_type,
            } => write!(
                f,
                "{class}.{field}: {refinement} refinement does not apply to type {}",
                field_type.name()
            ),
            SchemaError::DuplicateSerializedName { class, name } => {
                write!(f, "{class}: more than one field serializes as `{name}`")
            }
            SchemaError::DuplicateFieldNumber { class, number } => {
                write!(f, "{class}: field number {number} is pinned twice")
            }
            SchemaError::TypeNameMismatch {
                declared,
                described,
            } => write!(f, "{declared} describes itself as {described}"),
            SchemaError::InvalidEnumBacking { enumeration, case } => {
                write!(f, "{enumeration}::{case}: backing value does not match the enum kind")
            }
        }
    }
}

impl core::error::Error for SchemaError {}

/// An error raised by a [`Reflect`](crate::Reflect) implementation, or while
/// converting a [`Value`](crate::Value) into a concrete Rust type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectError {
    /// The object has no property with this name.
    NoSuchProperty {
        /// The object's type.
        type_name: &'static str,
        /// The requested property.
        property: String,
    },
    /// The object has no method with this name.
    NoSuchMethod {
        /// The object's type.
        type_name: &'static str,
        /// The requested method.
        method: String,
    },
    /// A value had another shape than the one requested.
    WrongType {
        /// What the conversion wanted.
        expected: &'static str,
        /// What it got.
        found: String,
    },
    /// A number does not fit the target type.
    OutOfRange {
        /// The number, rendered.
        value: String,
        /// The target type.
        target: &'static str,
    },
    /// The object does not implement an optional capability.
    Unsupported {
        /// The object's type.
        type_name: &'static str,
        /// The missing capability.
        operation: &'static str,
    },
    /// Any other failure reported by user code.
    Custom(String),
}

impl ReflectError {
    /// Shorthand for [`ReflectError::NoSuchProperty`].
    pub fn no_such_property(type_name: &'static str, property: &str) -> Self {
        ReflectError::NoSuchProperty {
            type_name,
            property: property.into(),
        }
    }

    /// Shorthand for [`ReflectError::WrongType`].
    pub fn wrong_type(expected: &'static str, found: impl Into<String>) -> Self {
        ReflectError::WrongType {
            expected,
            found: found.into(),
        }
    }
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectError::NoSuchProperty {
                type_name,
                property,
            } => write!(f, "{type_name} has no property `{property}`"),
            ReflectError::NoSuchMethod { type_name, method } => {
                write!(f, "{type_name} has no method `{method}`")
            }
            ReflectError::WrongType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ReflectError::OutOfRange { value, target } => {
                write!(f, "{value} is out of range for {target}")
            }
            ReflectError::Unsupported {
                type_name,
                operation,
            } => write!(f, "{type_name} does not support {operation}"),
            ReflectError::Custom(message) => f.write_str(message),
        }
    }
}

impl core::error::Error for ReflectError {}
