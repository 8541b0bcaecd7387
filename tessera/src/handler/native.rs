use alloc::boxed::Box;

use indexmap::IndexMap;
use tessera_core::{Dict, FieldDescriptor, ObjectRef, Reflect, ReflectError, Registry, Value};

use crate::{DeserializeError, Deformatter, Deserializer, Formatter, SerializeError, Serializer};

pub(super) fn can_export(value: &Value, registry: &Registry) -> bool {
    match value {
        Value::Object(object) => registry.is_native(object.type_name()),
        _ => false,
    }
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
    export_reflect(serializer, running, field, &*object.borrow())
}

/// Writes an object through its own map export.
pub(crate) fn export_reflect<F: Formatter>(
    serializer: &mut Serializer<'_, F>,
    running: &mut F::Running,
    field: &FieldDescriptor,
    object: &dyn Reflect,
) -> Result<(), SerializeError> {
    let data = object
        .native_serialize()
        .ok_or(ReflectError::Unsupported {
            type_name: object.type_name(),
            operation: "native serialization",
        })?;

    serializer.enter(object)?;
    let mut dict = Dict::new();
    for (key, value) in data {
        let item = FieldDescriptor::for_value(key.clone(), &value);
        dict.push(key, item, value);
    }
    serializer
        .formatter()
        .serialize_dictionary(running, field, &dict, serializer)?;
    serializer.leave();
    Ok(())
}

pub(super) fn import<D: Deformatter>(
    deserializer: &mut Deserializer<'_, D>,
    decoded: &mut D::Decoded,
    field: &FieldDescriptor,
) -> Result<Option<Value>, DeserializeError> {
    let type_name = field.type_name.unwrap_or_default();
    let Some(class) = deserializer.registry().resolve(type_name) else {
        return Err(DeserializeError::UnknownType {
            type_name: type_name.into(),
        });
    };
    Ok(import_reflect(deserializer, decoded, field, class)?
        .map(|object| Value::Object(ObjectRef::Owned(object))))
}

/// Restores an object through its own map import.
pub(crate) fn import_reflect<D: Deformatter>(
    deserializer: &mut Deserializer<'_, D>,
    decoded: &mut D::Decoded,
    field: &FieldDescriptor,
    type_name: &'static str,
) -> Result<Option<Box<dyn Reflect>>, DeserializeError> {
    let deformatter = deserializer.deformatter();
    let Some(dict) = deformatter.deserialize_dictionary(decoded, &field.as_dictionary(), deserializer)?
    else {
        return Ok(None);
    };

    let registry = deserializer.registry();
    let mut object = registry
        .instantiate(type_name)
        .ok_or_else(|| DeserializeError::UnknownType {
            type_name: type_name.into(),
        })?;
    let data: IndexMap<_, _> = dict
        .into_iter()
        .map(|item| (item.key.to_name(), item.value))
        .collect();
    object.native_unserialize(data)?;

    if let Some(class) = registry.descriptor(type_name) {
        deserializer.post_load(&mut *object, &class.post_load)?;
    }
    Ok(Some(object))
}
