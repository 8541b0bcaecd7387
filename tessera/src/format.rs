//! The traits a format implements.
//!
//! A format only ever sees scalars, plus sequences, dictionaries and object
//! dictionaries whose items carry their own field descriptors. Recursion
//! goes back through the [`Serializer`] or [`Deserializer`] handed to the
//! collection methods, so every nested value passes through the handler
//! chain again.

use tessera_core::{Dict, FieldDescriptor, ScalarKind, Sequence, Value};

use crate::{DeserializeError, Deserializer, SerializeError, Serializer};

/// Writes values into a format-specific running output.
pub trait Formatter: Sized {
    /// The output under construction.
    type Running;
    /// The finished output.
    type Output;

    /// Name of the format, as seen by handlers.
    fn format(&self) -> &'static str;

    /// Starts a new output for the given root field.
    fn init(&self, root: &FieldDescriptor) -> Self::Running;

    /// Turns the running output into the final result.
    fn finalize(&self, running: Self::Running) -> Result<Self::Output, SerializeError>;

    /// Writes an integer.
    fn serialize_int(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: i64,
    ) -> Result<(), SerializeError>;

    /// Writes a float.
    fn serialize_float(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: f64,
    ) -> Result<(), SerializeError>;

    /// Writes a boolean.
    fn serialize_bool(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: bool,
    ) -> Result<(), SerializeError>;

    /// Writes a string.
    fn serialize_string(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: &str,
    ) -> Result<(), SerializeError>;

    /// Records a null or uninitialized value. Nothing is written by default.
    fn serialize_null(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
    ) -> Result<(), SerializeError> {
        let _ = (running, field);
        Ok(())
    }

    /// Writes a list.
    fn serialize_sequence(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        sequence: &Sequence,
        serializer: &mut Serializer<'_, Self>,
    ) -> Result<(), SerializeError>;

    /// Writes a map.
    fn serialize_dictionary(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        dict: &Dict,
        serializer: &mut Serializer<'_, Self>,
    ) -> Result<(), SerializeError>;

    /// Writes an object, given as the dictionary of its serialized fields.
    fn serialize_object(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        dict: &Dict,
        serializer: &mut Serializer<'_, Self>,
    ) -> Result<(), SerializeError>;
}

/// What the next value for a field looks like, for formats that can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedKind {
    /// The field is absent.
    Missing,
    /// The field is present and null.
    Null,
    /// A scalar of this kind.
    Scalar(ScalarKind),
    /// A list.
    Sequence,
    /// A map or nested object.
    Dictionary,
}

/// Reads values out of a format-specific decoded input.
///
/// Every `deserialize_*` method returns `Ok(None)` when the field is absent
/// and `Ok(Some(Value::Null))` when it is present but null.
pub trait Deformatter: Sized {
    /// The raw input.
    type Input<'i>;
    /// The decoded state values are read from.
    type Decoded;

    /// Name of the format, as seen by handlers.
    fn format(&self) -> &'static str;

    /// Decodes the raw input.
    fn init(&self, input: Self::Input<'_>) -> Result<Self::Decoded, DeserializeError>;

    /// Releases the decoded state once the root object is built.
    fn finalize(&self, decoded: Self::Decoded) -> Result<(), DeserializeError> {
        drop(decoded);
        Ok(())
    }

    /// Reads an integer.
    fn deserialize_int(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError>;

    /// Reads a float.
    fn deserialize_float(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError>;

    /// Reads a boolean.
    fn deserialize_bool(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError>;

    /// Reads a string.
    fn deserialize_string(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError>;

    /// Reads a list.
    fn deserialize_sequence(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
        deserializer: &mut Deserializer<'_, Self>,
    ) -> Result<Option<Sequence>, DeserializeError>;

    /// Reads a map.
    fn deserialize_dictionary(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
        deserializer: &mut Deserializer<'_, Self>,
    ) -> Result<Option<Dict>, DeserializeError>;

    /// Opens a nested object, returning the decoded state to read its
    /// fields from.
    fn deserialize_object(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Self::Decoded>, DeserializeError>;

    /// Whether fields are looked up by name, so that unclaimed keys can be
    /// handed to collecting fields.
    fn supports_collecting(&self) -> bool {
        false
    }

    /// Everything not yet claimed by a field.
    fn remaining_data(
        &self,
        decoded: &mut Self::Decoded,
    ) -> Result<Option<Dict>, DeserializeError> {
        let _ = decoded;
        Ok(None)
    }

    /// Looks at the next value for a field without consuming it.
    ///
    /// `None` means the format cannot tell.
    fn introspect(&self, decoded: &Self::Decoded, field: &FieldDescriptor) -> Option<DecodedKind> {
        let _ = (decoded, field);
        None
    }
}
