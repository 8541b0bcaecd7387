//! Errors raised by the protobuf codec.

use alloc::boxed::Box;
use core::fmt;

use tessera::{DeserializeError, IntEncoding, SerializeError};

use crate::WireType;

/// What went wrong while encoding or decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtobufErrorKind {
    /// The input ended in the middle of a value.
    UnexpectedEof,
    /// A varint ran past 64 bits.
    VarintOverflow,
    /// A tag carried a wire type this codec does not read.
    InvalidWireType(u8),
    /// A field number is zero or larger than 2^29 - 1.
    InvalidFieldNumber(u64),
    /// A field was written with another wire type than its declaration needs.
    WireTypeMismatch {
        /// The field number.
        field: u32,
        /// What the declaration needs.
        expected: WireType,
        /// What the input held.
        found: WireType,
    },
    /// A string field holds invalid UTF-8.
    InvalidUtf8,
    /// A length prefix does not fit in memory.
    LengthOverflow(u64),
    /// An integer does not fit its declared encoding.
    ValueOutOfRange {
        /// The value.
        value: i128,
        /// The declared encoding.
        encoding: IntEncoding,
    },
    /// A repeated value was nested directly inside another repeated field.
    NestedRepeated {
        /// The field number already repeating.
        field: u32,
    },
    /// A map entry key is neither a varint nor a string.
    InvalidMapKey,
}

impl ProtobufErrorKind {
    /// Stable identifier of the kind.
    pub fn code(&self) -> &'static str {
        match self {
            ProtobufErrorKind::UnexpectedEof => "unexpected_eof",
            ProtobufErrorKind::VarintOverflow => "varint_overflow",
            ProtobufErrorKind::InvalidWireType(_) => "invalid_wire_type",
            ProtobufErrorKind::InvalidFieldNumber(_) => "invalid_field_number",
            ProtobufErrorKind::WireTypeMismatch { .. } => "wire_type_mismatch",
            ProtobufErrorKind::InvalidUtf8 => "invalid_utf8",
            ProtobufErrorKind::LengthOverflow(_) => "length_overflow",
            ProtobufErrorKind::ValueOutOfRange { .. } => "value_out_of_range",
            ProtobufErrorKind::NestedRepeated { .. } => "nested_repeated",
            ProtobufErrorKind::InvalidMapKey => "invalid_map_key",
        }
    }
}

impl fmt::Display for ProtobufErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtobufErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            ProtobufErrorKind::VarintOverflow => write!(f, "varint longer than 64 bits"),
            ProtobufErrorKind::InvalidWireType(wire_type) => {
                write!(f, "unsupported wire type {wire_type}")
            }
            ProtobufErrorKind::InvalidFieldNumber(number) => {
                write!(f, "invalid field number {number}")
            }
            ProtobufErrorKind::WireTypeMismatch {
                field,
                expected,
                found,
            } => write!(f, "field {field}: expected wire type {expected}, found {found}"),
            ProtobufErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8 in string"),
            ProtobufErrorKind::LengthOverflow(len) => write!(f, "length {len} is too large"),
            ProtobufErrorKind::ValueOutOfRange { value, encoding } => {
                write!(f, "{value} is out of range for {encoding:?}")
            }
            ProtobufErrorKind::NestedRepeated { field } => {
                write!(f, "field {field} is already repeating")
            }
            ProtobufErrorKind::InvalidMapKey => write!(f, "map key is not an integer or string"),
        }
    }
}

/// An error raised by the protobuf codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtobufError {
    /// What went wrong.
    pub kind: ProtobufErrorKind,
    /// Byte offset in the buffer being decoded, when known.
    pub pos: Option<usize>,
}

impl ProtobufError {
    /// An error with no position.
    pub fn new(kind: ProtobufErrorKind) -> Self {
        ProtobufError { kind, pos: None }
    }

    /// An error at a byte offset.
    pub fn at(kind: ProtobufErrorKind, pos: usize) -> Self {
        ProtobufError {
            kind,
            pos: Some(pos),
        }
    }
}

impl From<ProtobufErrorKind> for ProtobufError {
    fn from(kind: ProtobufErrorKind) -> Self {
        ProtobufError::new(kind)
    }
}

impl fmt::Display for ProtobufError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{} at position {pos}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl core::error::Error for ProtobufError {}

#[cfg(feature = "pretty-errors")]
impl miette::Diagnostic for ProtobufError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(alloc::format!(
            "tessera_protobuf::{}",
            self.kind.code()
        )))
    }
}

impl From<ProtobufError> for SerializeError {
    fn from(error: ProtobufError) -> Self {
        SerializeError::Format(Box::new(error))
    }
}

impl From<ProtobufError> for DeserializeError {
    fn from(error: ProtobufError) -> Self {
        DeserializeError::Format(Box::new(error))
    }
}

impl From<ProtobufErrorKind> for SerializeError {
    fn from(kind: ProtobufErrorKind) -> Self {
        ProtobufError::new(kind).into()
    }
}

impl From<ProtobufErrorKind> for DeserializeError {
    fn from(kind: ProtobufErrorKind) -> Self {
        ProtobufError::new(kind).into()
    }
}
