use alloc::string::String;
use alloc::vec::Vec;

use indexmap::IndexMap;
use tessera_core::{Dict, FieldDescriptor, FieldType, Key, KeyType, Value};

use super::{explode, explode_part, implode_part, read_imploded};
use crate::{DeserializeError, Deformatter, Deserializer, Formatter, SerializeError, Serializer};

pub(super) fn can_export(field: &FieldDescriptor, value: &Value) -> bool {
    let shape = match value {
        Value::Dict(_) => true,
        Value::Sequence(_) => field.dictionary_settings().is_some(),
        _ => false,
    };
    shape && matches!(field.field_type, FieldType::Array | FieldType::Mixed)
}

fn export_key(field: &FieldDescriptor, key: Key) -> Result<Key, SerializeError> {
    match field.dictionary_settings().and_then(|d| d.key_type) {
        Some(KeyType::Int) => key.as_int().map(Key::Int).ok_or_else(|| SerializeError::TypeMismatch {
            field: field.name.clone(),
            expected: "int key",
            found: key.to_name(),
        }),
        Some(KeyType::String) => Ok(Key::String(key.to_name())),
        None => Ok(key),
    }
}

pub(super) fn export<F: Formatter>(
    serializer: &mut Serializer<'_, F>,
    running: &mut F::Running,
    field: &FieldDescriptor,
    value: &Value,
) -> Result<(), SerializeError> {
    let entries: Vec<(Key, &Value)> = match value {
        Value::Dict(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (Key::Int(i as i64), v))
            .collect(),
        _ => Vec::new(),
    };
    let formatter = serializer.formatter();
    let settings = field.dictionary_settings();

    if let Some((separator, join)) = settings.and_then(|s| s.implode_on.as_deref().zip(s.join_on.as_deref())) {
        let pairs = entries
            .into_iter()
            .map(|(key, value)| {
                let key = export_key(field, key)?;
                Ok(alloc::format!("{key}{join}{}", implode_part(field, value)?))
            })
            .collect::<Result<Vec<String>, SerializeError>>()?;
        return formatter.serialize_string(running, field, &pairs.join(separator));
    }

    let mut dict = Dict::new();
    for (key, value) in entries {
        let key = export_key(field, key)?;
        let element = field.export_element_field(&key, value);
        dict.push(key, element, value.clone());
    }
    formatter.serialize_dictionary(running, field, &dict, serializer)
}

fn import_key(field: &FieldDescriptor, key: Key) -> Result<Key, DeserializeError> {
    match field.dictionary_settings().and_then(|d| d.key_type) {
        Some(KeyType::Int) => key.as_int().map(Key::Int).ok_or_else(|| {
            DeserializeError::InvalidArrayKeyType {
                field: field.name.clone(),
                key: key.to_name(),
            }
        }),
        Some(KeyType::String) => Ok(Key::String(key.to_name())),
        None => Ok(key),
    }
}

pub(super) fn import<D: Deformatter>(
    deserializer: &mut Deserializer<'_, D>,
    decoded: &mut D::Decoded,
    field: &FieldDescriptor,
) -> Result<Option<Value>, DeserializeError> {
    let deformatter = deserializer.deformatter();
    let settings = field.dictionary_settings().cloned().unwrap_or_default();

    if let (Some(separator), Some(join)) = (settings.implode_on.as_deref(), settings.join_on.as_deref()) {
        let text = match read_imploded(deformatter, decoded, field)?.into_shortcut() {
            Ok(text) => text,
            Err(shortcut) => return Ok(shortcut),
        };
        let mut map = IndexMap::new();
        for pair in explode(&text, separator, settings.trim) {
            let Some((key, value)) = pair.split_once(join) else {
                return Err(DeserializeError::TypeMismatch {
                    field: field.name.clone(),
                    expected: "key/value pair",
                    found: "string",
                });
            };
            let (key, value) = if settings.trim {
                (key.trim(), value.trim())
            } else {
                (key, value)
            };
            let key = import_key(field, Key::String(key.into()))?;
            let element = field.element_field(&key);
            map.insert(key, explode_part(&element, value)?);
        }
        return Ok(Some(Value::Dict(map)));
    }

    let Some(dict) = deformatter.deserialize_dictionary(decoded, field, deserializer)? else {
        return Ok(None);
    };
    let mut map = IndexMap::with_capacity(dict.len());
    for item in dict {
        map.insert(import_key(field, item.key)?, item.value);
    }
    Ok(Some(Value::Dict(map)))
}
