use alloc::string::String;

use indexmap::IndexMap;
use tessera::{
    DecodedKind, DeserializeError, Deformatter, Deserializer, Dict, FieldDescriptor, Key,
    ScalarKind, Sequence, Value,
};
use tracing::{debug, trace};

/// Reads objects out of a tree of [`Value`]s.
///
/// Fields are looked up by serialized name and then by alias. Every name a
/// field answers to is consumed when it is read, so whatever is left can be
/// collected by a flattened array field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayDeformatter;

/// The unclaimed entries of the object being read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayDecoded {
    entries: IndexMap<String, Value>,
}

impl ArrayDecoded {
    fn single(name: &str, value: Value) -> Self {
        let mut entries = IndexMap::with_capacity(1);
        entries.insert(name.into(), value);
        ArrayDecoded { entries }
    }

    fn from_map(map: IndexMap<Key, Value>) -> Self {
        ArrayDecoded {
            entries: map
                .into_iter()
                .map(|(key, value)| (key.to_name(), value))
                .collect(),
        }
    }

    /// Names of the entries not yet read.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn peek(&self, field: &FieldDescriptor) -> Option<&Value> {
        field.names().find_map(|name| self.entries.get(name))
    }

    /// Removes every name the field answers to; the first one present wins.
    fn take(&mut self, field: &FieldDescriptor) -> Option<Value> {
        let mut found = None;
        for name in field.names() {
            if let Some(value) = self.entries.shift_remove(name) {
                found.get_or_insert(value);
            }
        }
        found
    }
}

/// Reads one element through the import chain.
fn read_element(
    deserializer: &mut Deserializer<'_, ArrayDeformatter>,
    element: &FieldDescriptor,
    value: Value,
) -> Result<Value, DeserializeError> {
    let mut slot = ArrayDecoded::single(&element.serialized_name, value);
    Ok(deserializer.deserialize(&mut slot, element)?.unwrap_or_default())
}

fn mismatch(field: &FieldDescriptor, expected: &'static str, found: &Value) -> DeserializeError {
    DeserializeError::TypeMismatch {
        field: field.name.clone(),
        expected,
        found: found.kind().name(),
    }
}

impl Deformatter for ArrayDeformatter {
    type Input<'i> = Value;
    type Decoded = ArrayDecoded;

    fn format(&self) -> &'static str {
        "array"
    }

    fn init(&self, input: Self::Input<'_>) -> Result<Self::Decoded, DeserializeError> {
        debug!(kind = %input.kind(), "array read");
        Ok(ArrayDecoded::single("root", input))
    }

    fn deserialize_int(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError> {
        Ok(decoded.take(field))
    }

    fn deserialize_float(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError> {
        Ok(decoded.take(field))
    }

    fn deserialize_bool(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError> {
        Ok(decoded.take(field))
    }

    fn deserialize_string(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError> {
        Ok(decoded.take(field))
    }

    fn deserialize_sequence(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
        deserializer: &mut Deserializer<'_, Self>,
    ) -> Result<Option<Sequence>, DeserializeError> {
        let values: alloc::vec::Vec<Value> = match decoded.take(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Sequence(values)) => values,
            // a list that went through a name-keyed format may come back keyed
            Some(Value::Dict(map)) => map.into_values().collect(),
            Some(other) => return Err(mismatch(field, "sequence", &other)),
        };

        trace!(field = %field.name, len = values.len(), "sequence");
        let mut sequence = Sequence::new();
        for (index, value) in values.into_iter().enumerate() {
            let element = field.element_field(&Key::Int(index as i64));
            let value = read_element(deserializer, &element, value)?;
            sequence.push(element, value);
        }
        Ok(Some(sequence))
    }

    fn deserialize_dictionary(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
        deserializer: &mut Deserializer<'_, Self>,
    ) -> Result<Option<Dict>, DeserializeError> {
        let entries: alloc::vec::Vec<(Key, Value)> = match decoded.take(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Dict(map)) => map.into_iter().collect(),
            Some(Value::Sequence(values)) => values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (Key::Int(index as i64), value))
                .collect(),
            Some(other) => return Err(mismatch(field, "dictionary", &other)),
        };

        trace!(field = %field.name, len = entries.len(), "dictionary");
        let mut dict = Dict::new();
        for (key, value) in entries {
            let element = field.element_field(&key);
            let value = read_element(deserializer, &element, value)?;
            dict.push(key, element, value);
        }
        Ok(Some(dict))
    }

    fn deserialize_object(
        &self,
        decoded: &mut Self::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Self::Decoded>, DeserializeError> {
        match decoded.take(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Dict(map)) => Ok(Some(ArrayDecoded::from_map(map))),
            Some(other) => Err(mismatch(field, "object", &other)),
        }
    }

    fn supports_collecting(&self) -> bool {
        true
    }

    fn remaining_data(
        &self,
        decoded: &mut Self::Decoded,
    ) -> Result<Option<Dict>, DeserializeError> {
        let mut dict = Dict::new();
        for (name, value) in decoded.entries.drain(..) {
            let field = FieldDescriptor::for_value(name.as_str(), &value);
            dict.push(name, field, value);
        }
        Ok(Some(dict))
    }

    fn introspect(&self, decoded: &Self::Decoded, field: &FieldDescriptor) -> Option<DecodedKind> {
        let Some(value) = decoded.peek(field) else {
            return Some(DecodedKind::Missing);
        };
        match value {
            Value::Null => Some(DecodedKind::Null),
            Value::Bool(_) => Some(DecodedKind::Scalar(ScalarKind::Bool)),
            Value::Int(_) => Some(DecodedKind::Scalar(ScalarKind::Int)),
            Value::Float(_) => Some(DecodedKind::Scalar(ScalarKind::Float)),
            Value::String(_) => Some(DecodedKind::Scalar(ScalarKind::String)),
            Value::Sequence(_) => Some(DecodedKind::Sequence),
            Value::Dict(_) => Some(DecodedKind::Dictionary),
            Value::Enum(_) | Value::DateTime(_) | Value::Object(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_first_present_name_wins_and_all_are_consumed() {
        tessera_testhelpers::setup();
        let mut decoded = ArrayDecoded::default();
        decoded.entries.insert("b".into(), Value::Int(2));
        decoded.entries.insert("a".into(), Value::Int(1));
        decoded.entries.insert("other".into(), Value::Int(3));

        let field = FieldDescriptor::scalar("a", ScalarKind::Int)
            .alias("b")
            .build();
        assert_eq!(decoded.take(&field), Some(Value::Int(1)));
        assert_eq!(decoded.keys().collect::<alloc::vec::Vec<_>>(), ["other"]);
    }

    #[test]
    fn introspection_reports_missing_and_null() {
        tessera_testhelpers::setup();
        let decoded = ArrayDecoded::single("present", Value::Null);
        let present = FieldDescriptor::mixed("present").build();
        let absent = FieldDescriptor::mixed("absent").build();

        assert_eq!(
            ArrayDeformatter.introspect(&decoded, &present),
            Some(DecodedKind::Null)
        );
        assert_eq!(
            ArrayDeformatter.introspect(&decoded, &absent),
            Some(DecodedKind::Missing)
        );
    }
}
