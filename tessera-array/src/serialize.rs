use alloc::string::String;

use indexmap::IndexMap;
use tessera::{
    Dict, FieldDescriptor, Formatter, Key, SerializeError, Sequence, Serializer, Value,
};
use tracing::{debug, trace};

/// Writes objects as a tree of [`Value`]s.
///
/// Objects become string-keyed [`Value::Dict`]s, sequences become
/// [`Value::Sequence`]s and dictionaries keep their keys. Null values are
/// left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayFormatter;

/// Entries of the object being written, keyed by serialized name.
pub type ArrayBuffer = IndexMap<String, Value>;

/// Writes a single value into a scratch buffer and takes it back out.
fn write_one(
    serializer: &mut Serializer<'_, ArrayFormatter>,
    field: &FieldDescriptor,
    value: &Value,
) -> Result<Value, SerializeError> {
    let mut slot = ArrayBuffer::new();
    serializer.serialize(&mut slot, field, value)?;
    Ok(slot.pop().map(|(_, value)| value).unwrap_or_default())
}

impl Formatter for ArrayFormatter {
    type Running = ArrayBuffer;
    type Output = Value;

    fn format(&self) -> &'static str {
        "array"
    }

    fn init(&self, _root: &FieldDescriptor) -> Self::Running {
        ArrayBuffer::new()
    }

    fn finalize(&self, mut running: Self::Running) -> Result<Self::Output, SerializeError> {
        let root = running.shift_remove("root").unwrap_or_default();
        debug!(kind = %root.kind(), "array written");
        Ok(root)
    }

    fn serialize_int(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: i64,
    ) -> Result<(), SerializeError> {
        running.insert(field.serialized_name.clone(), Value::Int(value));
        Ok(())
    }

    fn serialize_float(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: f64,
    ) -> Result<(), SerializeError> {
        running.insert(field.serialized_name.clone(), Value::Float(value));
        Ok(())
    }

    fn serialize_bool(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: bool,
    ) -> Result<(), SerializeError> {
        running.insert(field.serialized_name.clone(), Value::Bool(value));
        Ok(())
    }

    fn serialize_string(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        value: &str,
    ) -> Result<(), SerializeError> {
        running.insert(field.serialized_name.clone(), Value::String(value.into()));
        Ok(())
    }

    fn serialize_sequence(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        sequence: &Sequence,
        serializer: &mut Serializer<'_, Self>,
    ) -> Result<(), SerializeError> {
        let values = sequence
            .iter()
            .map(|item| write_one(serializer, &item.field, &item.value))
            .collect::<Result<_, _>>()?;
        running.insert(field.serialized_name.clone(), Value::Sequence(values));
        Ok(())
    }

    fn serialize_dictionary(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        dict: &Dict,
        serializer: &mut Serializer<'_, Self>,
    ) -> Result<(), SerializeError> {
        let mut map = IndexMap::with_capacity(dict.len());
        for item in dict {
            map.insert(item.key.clone(), write_one(serializer, &item.field, &item.value)?);
        }
        running.insert(field.serialized_name.clone(), Value::Dict(map));
        Ok(())
    }

    fn serialize_object(
        &self,
        running: &mut Self::Running,
        field: &FieldDescriptor,
        dict: &Dict,
        serializer: &mut Serializer<'_, Self>,
    ) -> Result<(), SerializeError> {
        let mut object = ArrayBuffer::with_capacity(dict.len());
        for item in dict {
            serializer.serialize(&mut object, &item.field, &item.value)?;
        }
        trace!(field = %field.name, keys = object.len(), "object");
        let map = object
            .into_iter()
            .map(|(name, value)| (Key::String(name), value))
            .collect();
        running.insert(field.serialized_name.clone(), Value::Dict(map));
        Ok(())
    }
}
