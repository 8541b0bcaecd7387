//! Type maps: discriminator-based polymorphism for object fields.

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use indexmap::IndexMap;

/// Maps discriminator values to class names, and back.
pub trait TypeMap: Send + Sync + fmt::Debug {
    /// The key the discriminator is written under.
    fn key_field(&self) -> &str;

    /// The class for a discriminator value.
    fn find_class(&self, id: &str) -> Option<String>;

    /// The discriminator value for a class.
    fn find_identifier(&self, class: &str) -> Option<String>;
}

/// A fixed table of discriminator values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTypeMap {
    key: String,
    classes: IndexMap<String, String>,
}

impl StaticTypeMap {
    /// Builds a map from `(id, class)` pairs.
    pub fn new<K, I, A, B>(key: K, entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        StaticTypeMap {
            key: key.into(),
            classes: entries
                .into_iter()
                .map(|(id, class)| (id.into(), class.into()))
                .collect(),
        }
    }
}

impl TypeMap for StaticTypeMap {
    fn key_field(&self) -> &str {
        &self.key
    }

    fn find_class(&self, id: &str) -> Option<String> {
        self.classes.get(id).cloned()
    }

    fn find_identifier(&self, class: &str) -> Option<String> {
        self.classes
            .iter()
            .find(|(_, c)| c.as_str() == class)
            .map(|(id, _)| id.clone())
    }
}

/// Uses the class name itself as the discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNameTypeMap {
    key: String,
}

impl ClassNameTypeMap {
    /// A map writing class names under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        ClassNameTypeMap { key: key.into() }
    }
}

impl TypeMap for ClassNameTypeMap {
    fn key_field(&self) -> &str {
        &self.key
    }

    fn find_class(&self, id: &str) -> Option<String> {
        Some(id.into())
    }

    fn find_identifier(&self, class: &str) -> Option<String> {
        Some(class.into())
    }
}

/// A type map attached to a field, a class or a type name.
#[derive(Debug, Clone)]
pub enum TypeMapping {
    /// See [`StaticTypeMap`].
    Static(StaticTypeMap),
    /// See [`ClassNameTypeMap`].
    ClassName(ClassNameTypeMap),
    /// A user implementation.
    Custom(Arc<dyn TypeMap>),
}

impl TypeMapping {
    fn inner(&self) -> &dyn TypeMap {
        match self {
            TypeMapping::Static(map) => map,
            TypeMapping::ClassName(map) => map,
            TypeMapping::Custom(map) => map.as_ref(),
        }
    }
}

impl TypeMap for TypeMapping {
    fn key_field(&self) -> &str {
        self.inner().key_field()
    }

    fn find_class(&self, id: &str) -> Option<String> {
        self.inner().find_class(id)
    }

    fn find_identifier(&self, class: &str) -> Option<String> {
        self.inner().find_identifier(class)
    }
}

impl PartialEq for TypeMapping {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeMapping::Static(a), TypeMapping::Static(b)) => a == b,
            (TypeMapping::ClassName(a), TypeMapping::ClassName(b)) => a == b,
            (TypeMapping::Custom(a), TypeMapping::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<StaticTypeMap> for TypeMapping {
    fn from(map: StaticTypeMap) -> Self {
        TypeMapping::Static(map)
    }
}

impl From<ClassNameTypeMap> for TypeMapping {
    fn from(map: ClassNameTypeMap) -> Self {
        TypeMapping::ClassName(map)
    }
}

impl From<Arc<dyn TypeMap>> for TypeMapping {
    fn from(map: Arc<dyn TypeMap>) -> Self {
        TypeMapping::Custom(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_maps_work_both_ways() {
        let map = StaticTypeMap::new("size", [("big", "BigTask"), ("small", "SmallTask")]);
        assert_eq!(map.key_field(), "size");
        assert_eq!(map.find_class("big").as_deref(), Some("BigTask"));
        assert_eq!(map.find_identifier("SmallTask").as_deref(), Some("small"));
        assert_eq!(map.find_class("medium"), None);
        assert_eq!(map.find_identifier("MediumTask"), None);
    }

    #[test]
    fn class_name_maps_echo() {
        let map = TypeMapping::from(ClassNameTypeMap::new("type"));
        assert_eq!(map.key_field(), "type");
        assert_eq!(map.find_class("Circle").as_deref(), Some("Circle"));
        assert_eq!(map.find_identifier("Square").as_deref(), Some("Square"));
    }
}
