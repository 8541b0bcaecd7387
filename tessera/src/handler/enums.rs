use alloc::string::ToString;

use tessera_core::{Backing, EnumKind, EnumValue, FieldDescriptor, Value};

use crate::{DeserializeError, Deformatter, Deserializer, Formatter, SerializeError, Serializer};

pub(super) fn can_export(value: &Value) -> bool {
    matches!(value, Value::Enum(_))
}

pub(super) fn export<F: Formatter>(
    serializer: &mut Serializer<'_, F>,
    running: &mut F::Running,
    field: &FieldDescriptor,
    value: &Value,
) -> Result<(), SerializeError> {
    let Value::Enum(EnumValue { type_name, case }) = value else {
        return Ok(());
    };
    let descriptor = serializer
        .registry()
        .enumeration(type_name)
        .ok_or_else(|| SerializeError::UnknownType {
            type_name: (*type_name).into(),
        })?;
    let case = descriptor
        .case(case)
        .ok_or_else(|| SerializeError::TypeMismatch {
            field: field.name.clone(),
            expected: descriptor.name,
            found: case.clone(),
        })?;

    let formatter = serializer.formatter();
    match case.backing {
        None => formatter.serialize_string(running, field, case.name),
        Some(Backing::Int(i)) => formatter.serialize_int(running, field, i),
        Some(Backing::String(s)) => formatter.serialize_string(running, field, s),
    }
}

pub(super) fn import<D: Deformatter>(
    deserializer: &mut Deserializer<'_, D>,
    decoded: &mut D::Decoded,
    field: &FieldDescriptor,
) -> Result<Option<Value>, DeserializeError> {
    let type_name = field.type_name.unwrap_or_default();
    let descriptor = deserializer
        .registry()
        .enumeration(type_name)
        .ok_or_else(|| DeserializeError::UnknownType {
            type_name: type_name.into(),
        })?;
    let deformatter = deserializer.deformatter();

    let raw = match descriptor.kind {
        EnumKind::Int => deformatter.deserialize_int(decoded, field)?,
        EnumKind::Unit | EnumKind::String => deformatter.deserialize_string(decoded, field)?,
    };
    let raw = match raw {
        None => return Ok(None),
        Some(Value::Null) => return Ok(Some(Value::Null)),
        Some(raw) => raw,
    };

    let case = match (descriptor.kind, &raw) {
        (EnumKind::Int, Value::Int(i)) => descriptor.case_by_int(*i),
        (EnumKind::Unit, Value::String(s)) => descriptor.case(s),
        (EnumKind::String, Value::String(s)) => descriptor.case_by_str(s),
        _ => None,
    };
    match case {
        Some(case) => Ok(Some(Value::Enum(EnumValue {
            type_name: descriptor.name,
            case: case.name.into(),
        }))),
        None => Err(DeserializeError::InvalidEnumCase {
            field: field.name.clone(),
            enumeration: descriptor.name,
            value: match raw {
                Value::String(s) => s,
                Value::Int(i) => i.to_string(),
                other => other.describe(),
            },
        }),
    }
}
