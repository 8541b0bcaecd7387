use alloc::string::String;
use alloc::vec::Vec;

use tessera_core::{FieldDescriptor, FieldType, Key, Sequence, Value};

use super::{explode, explode_part, implode_part, read_imploded};
use crate::{DeserializeError, Deformatter, Deserializer, Formatter, SerializeError, Serializer};

pub(super) fn can_export(field: &FieldDescriptor, value: &Value) -> bool {
    matches!(value, Value::Sequence(_))
        && matches!(field.field_type, FieldType::Array | FieldType::Mixed)
        && field.dictionary_settings().is_none()
}

pub(super) fn export<F: Formatter>(
    serializer: &mut Serializer<'_, F>,
    running: &mut F::Running,
    field: &FieldDescriptor,
    value: &Value,
) -> Result<(), SerializeError> {
    let Value::Sequence(values) = value else {
        return Ok(());
    };
    let formatter = serializer.formatter();

    if let Some(separator) = field.sequence_settings().and_then(|s| s.implode_on.as_deref()) {
        let parts = values
            .iter()
            .map(|v| implode_part(field, v))
            .collect::<Result<Vec<String>, _>>()?;
        return formatter.serialize_string(running, field, &parts.join(separator));
    }

    let mut sequence = Sequence::new();
    for (index, value) in values.iter().enumerate() {
        let key = Key::Int(index as i64);
        sequence.push(field.export_element_field(&key, value), value.clone());
    }
    formatter.serialize_sequence(running, field, &sequence, serializer)
}

pub(super) fn import<D: Deformatter>(
    deserializer: &mut Deserializer<'_, D>,
    decoded: &mut D::Decoded,
    field: &FieldDescriptor,
) -> Result<Option<Value>, DeserializeError> {
    let deformatter = deserializer.deformatter();
    let settings = field.sequence_settings().cloned().unwrap_or_default();

    if let Some(separator) = settings.implode_on.as_deref() {
        let text = match read_imploded(deformatter, decoded, field)?.into_shortcut() {
            Ok(text) => text,
            Err(shortcut) => return Ok(shortcut),
        };
        let values = explode(&text, separator, settings.trim)
            .into_iter()
            .enumerate()
            .map(|(index, part)| explode_part(&field.element_field(&Key::Int(index as i64)), part))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some(Value::Sequence(values)));
    }

    Ok(deformatter
        .deserialize_sequence(decoded, field, deserializer)?
        .map(|sequence| Value::Sequence(sequence.into_values())))
}
