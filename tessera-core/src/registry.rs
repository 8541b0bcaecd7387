//! The registry of classes, enums and type maps known to tessera.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::{
    ClassDescriptor, Describe, EnumDescriptor, FieldDescriptor, FieldType, Reflect, ReflectEnum,
    SchemaError, TypeMapping,
};

struct ClassEntry {
    descriptor: Arc<ClassDescriptor>,
    construct: fn() -> Box<dyn Reflect>,
    supertypes: &'static [&'static str],
}

fn construct<T: Describe>() -> Box<dyn Reflect> {
    Box::new(T::default())
}

type ScopeKey = (&'static str, Vec<String>);

/// Metadata for every type tessera can read or write.
///
/// Descriptors are validated on registration and cached per scope set, so
/// repeated lookups return the same shared descriptor.
#[derive(Default)]
pub struct Registry {
    classes: HashMap<&'static str, ClassEntry>,
    enums: HashMap<&'static str, Arc<EnumDescriptor>>,
    type_maps: HashMap<String, TypeMapping>,
    scoped: RwLock<HashMap<ScopeKey, Arc<ClassDescriptor>>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class.
    pub fn register<T: Describe>(&mut self) -> Result<&mut Self, SchemaError> {
        let descriptor = T::describe();
        if descriptor.name != T::TYPE_NAME {
            return Err(SchemaError::TypeNameMismatch {
                declared: T::TYPE_NAME,
                described: descriptor.name,
            });
        }
        descriptor.validate()?;
        debug!(
            class = descriptor.name,
            fields = descriptor.fields.len(),
            "registered class"
        );
        self.classes.insert(
            T::TYPE_NAME,
            ClassEntry {
                descriptor: Arc::new(descriptor),
                construct: construct::<T>,
                supertypes: T::supertypes(),
            },
        );
        self.scoped.get_mut().retain(|(name, _), _| *name != T::TYPE_NAME);
        Ok(self)
    }

    /// Registers an enum.
    pub fn register_enum<E: ReflectEnum>(&mut self) -> Result<&mut Self, SchemaError> {
        let descriptor = E::describe();
        if descriptor.name != E::TYPE_NAME {
            return Err(SchemaError::TypeNameMismatch {
                declared: E::TYPE_NAME,
                described: descriptor.name,
            });
        }
        descriptor.validate()?;
        debug!(enumeration = descriptor.name, "registered enum");
        self.enums.insert(E::TYPE_NAME, Arc::new(descriptor));
        Ok(self)
    }

    /// Attaches a type map to a class or interface name.
    ///
    /// Global maps win over maps declared on fields and classes.
    pub fn register_type_map(
        &mut self,
        type_name: impl Into<String>,
        map: impl Into<TypeMapping>,
    ) -> &mut Self {
        self.type_maps.insert(type_name.into(), map.into());
        self
    }

    /// Resolves a class name to its registered spelling.
    pub fn resolve(&self, type_name: &str) -> Option<&'static str> {
        self.classes.get_key_value(type_name).map(|(name, _)| *name)
    }

    /// The full, unfiltered descriptor of a class.
    pub fn descriptor(&self, type_name: &str) -> Option<&Arc<ClassDescriptor>> {
        self.classes.get(type_name).map(|entry| &entry.descriptor)
    }

    /// The descriptor of a class as seen under `scopes`.
    ///
    /// Scope order does not matter; results are cached.
    pub fn class(&self, type_name: &str, scopes: &[String]) -> Option<Arc<ClassDescriptor>> {
        let (&name, entry) = self.classes.get_key_value(type_name)?;

        let mut active = scopes.to_vec();
        active.sort();
        active.dedup();
        let key = (name, active);

        if let Some(hit) = self.scoped.read().get(&key) {
            return Some(Arc::clone(hit));
        }

        trace!(class = name, scopes = ?key.1, "building scoped descriptor");
        let filtered = Arc::new(entry.descriptor.for_scopes(&key.1));
        Some(Arc::clone(self.scoped.write().entry(key).or_insert(filtered)))
    }

    /// Creates a blank instance of a class.
    pub fn instantiate(&self, type_name: &str) -> Option<Box<dyn Reflect>> {
        self.classes.get(type_name).map(|entry| (entry.construct)())
    }

    /// Whether the class serializes itself through a plain map.
    pub fn is_native(&self, type_name: &str) -> bool {
        self.classes
            .get(type_name)
            .is_some_and(|entry| entry.descriptor.native)
    }

    /// The descriptor of an enum.
    pub fn enumeration(&self, type_name: &str) -> Option<&Arc<EnumDescriptor>> {
        self.enums.get(type_name)
    }

    /// Declared supertypes of a class.
    pub fn supertypes(&self, type_name: &str) -> &'static [&'static str] {
        self.classes
            .get(type_name)
            .map(|entry| entry.supertypes)
            .unwrap_or_default()
    }

    /// The type map governing an object field, if any.
    ///
    /// A map registered for the declared type, or for one of its
    /// supertypes, wins; then the field's own map; then the map declared by
    /// the field's class.
    pub fn type_map_for<'a>(&'a self, field: &'a FieldDescriptor) -> Option<&'a TypeMapping> {
        if !matches!(field.field_type, FieldType::Object | FieldType::Mixed) {
            return None;
        }
        let declared = field.type_name;
        declared
            .and_then(|name| self.global_type_map(name, 0))
            .or(field.type_map.as_ref())
            .or_else(|| {
                declared
                    .and_then(|name| self.classes.get(name))
                    .and_then(|entry| entry.descriptor.type_map.as_ref())
            })
    }

    fn global_type_map(&self, type_name: &str, depth: usize) -> Option<&TypeMapping> {
        if let Some(map) = self.type_maps.get(type_name) {
            return Some(map);
        }
        // supertype lists may form a loop
        if depth >= 16 {
            return None;
        }
        self.supertypes(type_name)
            .iter()
            .find_map(|parent| self.global_type_map(parent, depth + 1))
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .field("enums", &self.enums.keys().collect::<Vec<_>>())
            .field("type_maps", &self.type_maps.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassNameTypeMap, ReflectError, ScalarKind, StaticTypeMap, Value};

    #[derive(Debug, Clone, Default)]
    struct Shape;

    impl Reflect for Shape {
        fn type_name(&self) -> &'static str {
            Self::TYPE_NAME
        }

        fn get(&self, _property: &str) -> Option<Value> {
            None
        }

        fn set(&mut self, property: &str, _value: Value) -> Result<(), ReflectError> {
            Err(ReflectError::no_such_property(Self::TYPE_NAME, property))
        }
    }

    impl Describe for Shape {
        const TYPE_NAME: &'static str = "Shape";

        fn describe() -> ClassDescriptor {
            ClassDescriptor::builder("Shape")
                .field(FieldDescriptor::scalar("sides", ScalarKind::Int))
                .field(FieldDescriptor::scalar("area", ScalarKind::Float).scopes(["geometry"]))
                .type_map(ClassNameTypeMap::new("kind"))
                .build()
        }

        fn supertypes() -> &'static [&'static str] {
            &["Drawable"]
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register::<Shape>().unwrap();
        registry
    }

    #[test]
    fn scoped_descriptors_are_cached_regardless_of_scope_order() {
        tessera_testhelpers::setup();
        let registry = registry();
        let a = registry
            .class("Shape", &["geometry".into(), "other".into()])
            .unwrap();
        let b = registry
            .class("Shape", &["other".into(), "geometry".into()])
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.fields.len(), 2);

        let unscoped = registry.class("Shape", &[]).unwrap();
        assert!(Arc::ptr_eq(&unscoped, &registry.class("Shape", &[]).unwrap()));
        assert_eq!(registry.class("Circle", &[]), None);
    }

    #[test]
    fn instantiates_blank_objects() {
        tessera_testhelpers::setup();
        let registry = registry();
        let shape = registry.instantiate("Shape").unwrap();
        assert_eq!(shape.type_name(), "Shape");
        assert!(registry.instantiate("Circle").is_none());
        assert_eq!(registry.resolve("Shape"), Some("Shape"));
    }

    #[test]
    fn global_maps_win_and_are_inherited() {
        tessera_testhelpers::setup();
        let mut registry = registry();
        let field = FieldDescriptor::object("shape", "Shape").build();
        assert_eq!(
            registry.type_map_for(&field),
            Some(&TypeMapping::from(ClassNameTypeMap::new("kind")))
        );

        let global = TypeMapping::from(StaticTypeMap::new("t", [("s", "Shape")]));
        registry.register_type_map("Drawable", global.clone());
        assert_eq!(registry.type_map_for(&field), Some(&global));

        let scalar = FieldDescriptor::scalar("sides", ScalarKind::Int).build();
        assert_eq!(registry.type_map_for(&scalar), None);
    }
}
