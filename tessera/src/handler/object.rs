use tessera_core::{FieldDescriptor, FieldType, ObjectRef, Reflect, Value};

use crate::{DeserializeError, Deformatter, Deserializer, Formatter, SerializeError, Serializer};

pub(super) fn can_export(field: &FieldDescriptor, value: &Value) -> bool {
    matches!(value, Value::Object(_))
        && matches!(field.field_type, FieldType::Object | FieldType::Mixed)
}

pub(super) fn export<F: Formatter>(
    serializer: &mut Serializer<'_, F>,
    running: &mut F::Running,
    field: &FieldDescriptor,
    value: &Value,
) -> Result<(), SerializeError> {
    let Value::Object(object) = value else {
        return Ok(());
    };
    let object = object.borrow();

    let retyped;
    let field = if field.field_type == FieldType::Mixed {
        retyped = field.with_type(FieldType::Object, Some(object.type_name()));
        &retyped
    } else {
        field
    };
    export_reflect(serializer, running, field, &*object)
}

/// Writes an object through its class metadata.
pub(crate) fn export_reflect<F: Formatter>(
    serializer: &mut Serializer<'_, F>,
    running: &mut F::Running,
    field: &FieldDescriptor,
    object: &dyn Reflect,
) -> Result<(), SerializeError> {
    serializer.enter(object)?;
    let dict = serializer.object_dict(field, object)?;
    serializer
        .formatter()
        .serialize_object(running, field, &dict, serializer)?;
    serializer.leave();
    Ok(())
}

pub(super) fn import<D: Deformatter>(
    deserializer: &mut Deserializer<'_, D>,
    decoded: &mut D::Decoded,
    field: &FieldDescriptor,
) -> Result<Option<Value>, DeserializeError> {
    let deformatter = deserializer.deformatter();
    let Some(mut nested) = deformatter.deserialize_object(decoded, field)? else {
        return Ok(None);
    };
    let Some(type_name) = deserializer.target_class(&mut nested, field)? else {
        return Ok(None);
    };
    let object = deserializer.populate(&mut nested, type_name)?;
    Ok(Some(Value::Object(ObjectRef::Owned(object))))
}
