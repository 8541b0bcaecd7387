use tessera_core::{FieldDescriptor, FieldType, ScalarKind, Value, coerce};

use super::scalar_kind;
use crate::{DeserializeError, Deformatter, Deserializer, Formatter, SerializeError, Serializer};

pub(super) fn can_export(field: &FieldDescriptor, value: &Value) -> bool {
    value.is_scalar() && matches!(field.field_type, FieldType::Scalar(_) | FieldType::Mixed)
}

pub(super) fn export<F: Formatter>(
    serializer: &mut Serializer<'_, F>,
    running: &mut F::Running,
    field: &FieldDescriptor,
    value: &Value,
) -> Result<(), SerializeError> {
    let formatter = serializer.formatter();
    let kind = match field.field_type {
        FieldType::Scalar(kind) => Some(kind),
        _ => scalar_kind(value),
    };
    match (kind, value) {
        (Some(ScalarKind::Int), Value::Int(i)) => formatter.serialize_int(running, field, *i),
        (Some(ScalarKind::Float), Value::Float(f)) => formatter.serialize_float(running, field, *f),
        (Some(ScalarKind::Float), Value::Int(i)) => {
            formatter.serialize_float(running, field, *i as f64)
        }
        (Some(ScalarKind::Bool), Value::Bool(b)) => formatter.serialize_bool(running, field, *b),
        (Some(ScalarKind::String), Value::String(s)) => {
            formatter.serialize_string(running, field, s)
        }
        _ => Err(SerializeError::TypeMismatch {
            field: field.name.clone(),
            expected: field.field_type.name(),
            found: value.describe(),
        }),
    }
}

pub(super) fn import<D: Deformatter>(
    deserializer: &mut Deserializer<'_, D>,
    decoded: &mut D::Decoded,
    field: &FieldDescriptor,
) -> Result<Option<Value>, DeserializeError> {
    let FieldType::Scalar(kind) = field.field_type else {
        return Ok(None);
    };
    let deformatter = deserializer.deformatter();
    let raw = match kind {
        ScalarKind::Int => deformatter.deserialize_int(decoded, field)?,
        ScalarKind::Float => deformatter.deserialize_float(decoded, field)?,
        ScalarKind::Bool => deformatter.deserialize_bool(decoded, field)?,
        ScalarKind::String => deformatter.deserialize_string(decoded, field)?,
    };
    match raw {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(Value::Null)),
        Some(value) => coerce(value, kind, field.strict)
            .map(Some)
            .map_err(|mismatch| DeserializeError::mismatch(&field.name, mismatch)),
    }
}
