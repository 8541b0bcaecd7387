//! Metadata-driven export of object graphs.

use alloc::string::String;
use alloc::vec::Vec;

use tessera_core::{
    Dict, FieldDescriptor, FieldType, Key, Reflect, Registry, TypeMap, Value, identity,
};
use tracing::{debug, trace};

use crate::handler::{Exporter, native, object};
use crate::{Formatter, SerializeError};

/// Walks an object graph and feeds it to a [`Formatter`].
///
/// One serializer exists per call. It owns the stack of objects currently
/// being written, which is how cycles are caught.
pub struct Serializer<'a, F: Formatter> {
    formatter: &'a F,
    registry: &'a Registry,
    exporters: &'a [Exporter],
    scopes: &'a [String],
    max_depth: usize,
    visiting: Vec<usize>,
}

impl<'a, F: Formatter> Serializer<'a, F> {
    pub(crate) fn new(
        formatter: &'a F,
        registry: &'a Registry,
        exporters: &'a [Exporter],
        scopes: &'a [String],
        max_depth: usize,
    ) -> Self {
        Serializer {
            formatter,
            registry,
            exporters,
            scopes,
            max_depth,
            visiting: Vec::new(),
        }
    }

    /// The active format.
    pub fn formatter(&self) -> &'a F {
        self.formatter
    }

    /// The registry metadata is read from.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// The active scopes.
    pub fn scopes(&self) -> &'a [String] {
        self.scopes
    }

    /// Writes one value through the export chain.
    ///
    /// Formats call this for every item of a collection they are writing.
    pub fn serialize(
        &mut self,
        running: &mut F::Running,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<(), SerializeError> {
        self.dispatch(running, field, value, 0)
    }

    /// Writes a value through the exporters from `start` on.
    pub(crate) fn dispatch(
        &mut self,
        running: &mut F::Running,
        field: &FieldDescriptor,
        value: &Value,
        start: usize,
    ) -> Result<(), SerializeError> {
        if value.is_null() {
            trace!(field = %field.name, "null");
            return self.formatter.serialize_null(running, field);
        }

        let format = self.formatter.format();
        let exporters = self.exporters;
        for (position, exporter) in exporters.iter().enumerate().skip(start) {
            if exporter.can_export(field, value, format, self.registry) {
                trace!(field = %field.name, exporter = exporter.name(), "export");
                return exporter.export(self, running, field, value, position);
            }
        }
        Err(SerializeError::NoExporterFound {
            field: field.name.clone(),
            value: value.describe(),
            format,
        })
    }

    /// Writes a root object and finishes the output.
    pub(crate) fn serialize_root(mut self, root: &dyn Reflect) -> Result<F::Output, SerializeError> {
        let type_name = root.type_name();
        let field = FieldDescriptor::root(type_name);
        debug!(
            root = type_name,
            format = self.formatter.format(),
            scopes = ?self.scopes,
            "serializing"
        );

        let mut running = self.formatter.init(&field);
        if self.registry.is_native(type_name) {
            native::export_reflect(&mut self, &mut running, &field, root)?;
        } else {
            object::export_reflect(&mut self, &mut running, &field, root)?;
        }
        self.formatter.finalize(running)
    }

    /// Pushes an object onto the stack of objects being written.
    pub(crate) fn enter(&mut self, object: &dyn Reflect) -> Result<(), SerializeError> {
        let id = identity(object);
        if self.visiting.contains(&id) {
            return Err(SerializeError::CircularReferenceDetected {
                type_name: object.type_name(),
            });
        }
        if self.visiting.len() >= self.max_depth {
            return Err(SerializeError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        self.visiting.push(id);
        Ok(())
    }

    /// Pops the object pushed by the matching [`Self::enter`].
    pub(crate) fn leave(&mut self) {
        self.visiting.pop();
    }

    /// Builds the dictionary of an object's serialized fields.
    ///
    /// Extra properties and the type-map discriminator come first, then the
    /// fields in declaration order with flattened fields expanded in place.
    pub(crate) fn object_dict(
        &mut self,
        field: &FieldDescriptor,
        object: &dyn Reflect,
    ) -> Result<Dict, SerializeError> {
        let mut dict = Dict::new();
        self.inject(&mut dict, field, object.type_name())?;
        self.expand_fields(&mut dict, object)?;
        Ok(dict)
    }

    fn inject(
        &self,
        dict: &mut Dict,
        field: &FieldDescriptor,
        type_name: &'static str,
    ) -> Result<(), SerializeError> {
        for (key, value) in &field.extra_properties {
            dict.push(
                key.as_str(),
                FieldDescriptor::for_value(key.as_str(), value),
                value.clone(),
            );
        }

        let Some(map) = self.registry.type_map_for(field) else {
            return Ok(());
        };
        let key = map.key_field();
        let id = map
            .find_identifier(type_name)
            .ok_or_else(|| SerializeError::NoIdentifierForType {
                type_name: type_name.into(),
                key: key.into(),
            })?;
        trace!(class = type_name, key, id = %id, "discriminator");
        dict.push(key, FieldDescriptor::discriminator(key), Value::String(id));
        Ok(())
    }

    fn expand_fields(&mut self, dict: &mut Dict, object: &dyn Reflect) -> Result<(), SerializeError> {
        let type_name = object.type_name();
        let class = self
            .registry
            .class(type_name, self.scopes)
            .ok_or_else(|| SerializeError::UnknownType {
                type_name: type_name.into(),
            })?;

        for field in &class.fields {
            let value = object.get(&field.name).unwrap_or(Value::Null);
            if !field.flatten {
                dict.push(field.serialized_name.as_str(), field.clone(), value);
                continue;
            }

            match value {
                Value::Null if field.field_type == FieldType::Object => {
                    self.expand_absent(dict, field, 0)?;
                }
                Value::Null => {}
                Value::Dict(map) if field.field_type == FieldType::Array => {
                    for (key, value) in map {
                        let item = field.export_element_field(&key, &value);
                        dict.push(key, item, value);
                    }
                }
                Value::Sequence(items) if field.field_type == FieldType::Array => {
                    for (index, value) in items.into_iter().enumerate() {
                        let key = Key::Int(index as i64);
                        let item = field.export_element_field(&key, &value);
                        dict.push(key, item, value);
                    }
                }
                Value::Object(child) if field.field_type == FieldType::Object => {
                    let child = child.borrow();
                    self.enter(&*child)?;
                    self.inject(dict, field, child.type_name())?;
                    self.expand_fields(dict, &*child)?;
                    self.leave();
                }
                other => {
                    return Err(SerializeError::TypeMismatch {
                        field: field.name.clone(),
                        expected: field.field_type.name(),
                        found: other.describe(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Writes nulls in place of an absent flattened object.
    ///
    /// Positional formats number every value, so the fields after the
    /// object keep the numbers they have when it is present.
    fn expand_absent(
        &self,
        dict: &mut Dict,
        field: &FieldDescriptor,
        depth: usize,
    ) -> Result<(), SerializeError> {
        if self.visiting.len() + depth >= self.max_depth {
            return Err(SerializeError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        for (key, value) in &field.extra_properties {
            dict.push(
                key.as_str(),
                FieldDescriptor::for_value(key.as_str(), value),
                Value::Null,
            );
        }
        if let Some(map) = self.registry.type_map_for(field) {
            // readers stop at the missing discriminator
            let key = map.key_field();
            dict.push(key, FieldDescriptor::discriminator(key), Value::Null);
            return Ok(());
        }

        let type_name = field.type_name.unwrap_or_default();
        let class = self
            .registry
            .class(type_name, self.scopes)
            .ok_or_else(|| SerializeError::UnknownType {
                type_name: type_name.into(),
            })?;
        trace!(field = %field.name, class = type_name, "absent flattened object");
        for child in &class.fields {
            if !child.flatten {
                dict.push(child.serialized_name.as_str(), child.clone(), Value::Null);
            } else if child.field_type == FieldType::Object {
                self.expand_absent(dict, child, depth + 1)?;
            }
        }
        Ok(())
    }
}
