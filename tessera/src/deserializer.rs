//! Metadata-driven import of object graphs.

use alloc::boxed::Box;
use alloc::string::String;

use tessera_core::{
    ClassDescriptor, FieldDescriptor, FieldType, ObjectRef, Reflect, Registry, TypeMap, Value,
};
use tracing::{debug, trace};

use crate::handler::Importer;
use crate::{DecodedKind, DeserializeError, Deformatter};

/// What to do with a field before it reaches the import chain.
enum Resolved {
    /// Import it as declared.
    Same,
    /// Import it as this field instead.
    As(FieldDescriptor),
    /// Nothing left to import.
    Done(Option<Value>),
}

/// Reads values out of a [`Deformatter`] and builds objects from them.
///
/// One deserializer exists per call.
pub struct Deserializer<'a, D: Deformatter> {
    deformatter: &'a D,
    registry: &'a Registry,
    importers: &'a [Importer],
    scopes: &'a [String],
    max_depth: usize,
    depth: usize,
    /// Non-null field values read so far.
    present: usize,
}

impl<'a, D: Deformatter> Deserializer<'a, D> {
    pub(crate) fn new(
        deformatter: &'a D,
        registry: &'a Registry,
        importers: &'a [Importer],
        scopes: &'a [String],
        max_depth: usize,
    ) -> Self {
        Deserializer {
            deformatter,
            registry,
            importers,
            scopes,
            max_depth,
            depth: 0,
            present: 0,
        }
    }

    /// The active format.
    pub fn deformatter(&self) -> &'a D {
        self.deformatter
    }

    /// The registry metadata is read from.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// The active scopes.
    pub fn scopes(&self) -> &'a [String] {
        self.scopes
    }

    /// Reads one value through the import chain.
    ///
    /// Formats call this for every item of a collection they are reading.
    /// `Ok(None)` means the value is absent.
    pub fn deserialize(
        &mut self,
        decoded: &mut D::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<Value>, DeserializeError> {
        self.import_from(decoded, field, 0)
    }

    /// Reads a value through the importers from `start` on.
    pub(crate) fn import_from(
        &mut self,
        decoded: &mut D::Decoded,
        field: &FieldDescriptor,
        start: usize,
    ) -> Result<Option<Value>, DeserializeError> {
        let resolved;
        let field = match self.resolve(decoded, field)? {
            Resolved::Same => field,
            Resolved::As(retyped) => {
                resolved = retyped;
                &resolved
            }
            Resolved::Done(value) => return Ok(value),
        };

        let format = self.deformatter.format();
        let importers = self.importers;
        for (position, importer) in importers.iter().enumerate().skip(start) {
            if importer.can_import(field, format, self.registry) {
                trace!(field = %field.name, importer = importer.name(), "import");
                return importer.import(self, decoded, field, position);
            }
        }
        Err(DeserializeError::NoImporterFound {
            field: field.name.clone(),
            format,
        })
    }

    /// Settles fields whose concrete type depends on the input.
    fn resolve(
        &self,
        decoded: &mut D::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Resolved, DeserializeError> {
        let deformatter = self.deformatter;
        let kind = deformatter.introspect(decoded, field);

        if kind == Some(DecodedKind::Null) || field.field_type == FieldType::Null {
            let read = deformatter.deserialize_string(decoded, field)?;
            return Ok(Resolved::Done(read.map(|_| Value::Null)));
        }

        match field.field_type {
            FieldType::Array if field.refinement.is_none() => Ok(Resolved::As(match kind {
                Some(DecodedKind::Dictionary) => field.as_dictionary(),
                _ => field.with_type(FieldType::Array, None),
            })),
            FieldType::Mixed => {
                let suggested = field.mixed_settings().and_then(|m| m.suggested);
                match (kind, suggested) {
                    (Some(DecodedKind::Missing), _) => {
                        // stream formats still have to step past the field
                        deformatter.deserialize_string(decoded, field)?;
                        Ok(Resolved::Done(None))
                    }
                    (Some(DecodedKind::Scalar(kind)), _) => Ok(Resolved::As(
                        field.with_type(FieldType::Scalar(kind), None),
                    )),
                    (Some(DecodedKind::Sequence), _) => {
                        Ok(Resolved::As(field.with_type(FieldType::Array, None)))
                    }
                    (_, Some(class)) => {
                        Ok(Resolved::As(field.with_type(FieldType::Object, Some(class))))
                    }
                    (Some(_), None) => Ok(Resolved::As(field.as_dictionary())),
                    (None, None) => Err(DeserializeError::UnresolvableMixed {
                        field: field.name.clone(),
                        format: deformatter.format(),
                    }),
                }
            }
            _ => Ok(Resolved::Same),
        }
    }

    /// Reads the root object of a call.
    pub(crate) fn deserialize_root(
        mut self,
        decoded: &mut D::Decoded,
        type_name: &'static str,
    ) -> Result<Box<dyn Reflect>, DeserializeError> {
        debug!(
            root = type_name,
            format = self.deformatter.format(),
            scopes = ?self.scopes,
            "deserializing"
        );
        let root = FieldDescriptor::root(type_name);
        match self.deserialize(decoded, &root)? {
            Some(Value::Object(object)) => Ok(object.into_boxed()),
            _ => Err(DeserializeError::MissingRoot { type_name }),
        }
    }

    /// The class an object field decodes to.
    ///
    /// Consumes the field's extra properties and, when a type map governs
    /// the field, its discriminator. `Ok(None)` means the discriminator is
    /// absent and the field is skipped.
    pub(crate) fn target_class(
        &mut self,
        decoded: &mut D::Decoded,
        field: &FieldDescriptor,
    ) -> Result<Option<&'static str>, DeserializeError> {
        for (key, value) in &field.extra_properties {
            let extra = FieldDescriptor::for_value(key.as_str(), value);
            self.deserialize(decoded, &extra)?;
        }

        let registry = self.registry;
        let Some(map) = registry.type_map_for(field) else {
            let declared = field.type_name.unwrap_or_default();
            return registry
                .resolve(declared)
                .map(Some)
                .ok_or_else(|| DeserializeError::UnknownType {
                    type_name: declared.into(),
                });
        };

        let key = map.key_field();
        let id = match self
            .deformatter
            .deserialize_string(decoded, &FieldDescriptor::discriminator(key))?
        {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(id)) => id,
            Some(other) => {
                return Err(DeserializeError::TypeMismatch {
                    field: key.into(),
                    expected: "string",
                    found: other.kind().name(),
                });
            }
        };
        let class = map
            .find_class(&id)
            .ok_or_else(|| DeserializeError::NoTypeMapDefinedForKey {
                field: field.name.clone(),
                key: id.clone(),
            })?;
        trace!(field = %field.name, id = %id, class = %class, "type map");
        registry
            .resolve(&class)
            .map(Some)
            .ok_or(DeserializeError::UnknownType { type_name: class })
    }

    /// Creates an object of `type_name` and fills it from `decoded`.
    pub(crate) fn populate(
        &mut self,
        decoded: &mut D::Decoded,
        type_name: &'static str,
    ) -> Result<Box<dyn Reflect>, DeserializeError> {
        if self.depth >= self.max_depth {
            return Err(DeserializeError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        let unknown = || DeserializeError::UnknownType {
            type_name: type_name.into(),
        };
        let class = self.registry.class(type_name, self.scopes).ok_or_else(unknown)?;
        let mut object = self.registry.instantiate(type_name).ok_or_else(unknown)?;

        self.depth += 1;
        self.fill(decoded, &class, &mut *object)?;
        self.depth -= 1;

        self.post_load(&mut *object, &class.post_load)?;
        Ok(object)
    }

    /// Runs post-load methods in declaration order.
    pub(crate) fn post_load(
        &self,
        object: &mut dyn Reflect,
        methods: &[String],
    ) -> Result<(), DeserializeError> {
        for method in methods {
            trace!(class = object.type_name(), method = %method, "post load");
            object.invoke(method)?;
        }
        Ok(())
    }

    fn fill(
        &mut self,
        decoded: &mut D::Decoded,
        class: &ClassDescriptor,
        object: &mut dyn Reflect,
    ) -> Result<(), DeserializeError> {
        let deformatter = self.deformatter;

        if !deformatter.supports_collecting() {
            for field in &class.fields {
                if field.is_collecting() {
                    return Err(DeserializeError::CollectingUnsupported {
                        field: field.name.clone(),
                        format: deformatter.format(),
                    });
                }
                if field.flatten {
                    self.fill_flattened(decoded, class, field, object)?;
                } else {
                    self.fill_field(decoded, class, field, object)?;
                }
            }
            return Ok(());
        }

        // named fields claim their keys before flattened objects and
        // collecting fields see what is left
        for field in class.fields.iter().filter(|f| !f.flatten) {
            self.fill_field(decoded, class, field, object)?;
        }
        for field in class.fields.iter().filter(|f| f.flatten && !f.is_collecting()) {
            self.fill_flattened(decoded, class, field, object)?;
        }
        for field in class.fields.iter().filter(|f| f.is_collecting()) {
            let remaining = deformatter
                .remaining_data(decoded)?
                .map(|dict| dict.into_map())
                .unwrap_or_default();
            trace!(field = %field.name, keys = remaining.len(), "collect");
            object.set(&field.name, Value::Dict(remaining))?;
        }
        Ok(())
    }

    fn fill_field(
        &mut self,
        decoded: &mut D::Decoded,
        class: &ClassDescriptor,
        field: &FieldDescriptor,
        object: &mut dyn Reflect,
    ) -> Result<(), DeserializeError> {
        match self.deserialize(decoded, field)? {
            Some(Value::Null) if !field.nullable => {
                if field.strict {
                    return Err(DeserializeError::TypeMismatch {
                        field: field.name.clone(),
                        expected: field.field_type.name(),
                        found: "null",
                    });
                }
                apply_missing(class, field, object)
            }
            Some(value) => {
                if !value.is_null() {
                    self.present += 1;
                }
                Ok(object.set(&field.name, value)?)
            }
            None => apply_missing(class, field, object),
        }
    }

    fn fill_flattened(
        &mut self,
        decoded: &mut D::Decoded,
        class: &ClassDescriptor,
        field: &FieldDescriptor,
        object: &mut dyn Reflect,
    ) -> Result<(), DeserializeError> {
        let Some(type_name) = self.target_class(decoded, field)? else {
            return apply_missing(class, field, object);
        };
        let before = self.present;
        let child = self.populate(decoded, type_name)?;

        // a discriminator is proof enough that the object is there
        let mapped = self.registry.type_map_for(field).is_some();
        if field.nullable && !mapped && self.present == before {
            trace!(field = %field.name, "flattened object absent");
            return apply_missing(class, field, object);
        }
        object.set(&field.name, Value::Object(ObjectRef::Owned(child)))?;
        Ok(())
    }
}

/// Applies the default of a field the input has no value for.
fn apply_missing(
    class: &ClassDescriptor,
    field: &FieldDescriptor,
    object: &mut dyn Reflect,
) -> Result<(), DeserializeError> {
    if field.use_default
        && let Some(default) = &field.default
    {
        object.set(&field.name, default.clone())?;
        return Ok(());
    }
    if field.require_value || class.require_values {
        return Err(DeserializeError::MissingRequiredValue {
            field: field.name.clone(),
            type_name: class.name,
        });
    }
    Ok(())
}
