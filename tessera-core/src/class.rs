//! Per-class metadata.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{FieldBuilder, FieldDescriptor, FieldType, RenameRule, SchemaError, TypeMapping};

/// Metadata describing a class: its fields and class-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    /// Registered name.
    pub name: &'static str,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Whether fields appear without being included explicitly.
    pub include_fields_by_default: bool,
    /// Scopes applied to fields that declare none.
    pub scopes: Option<Vec<String>>,
    /// Every field requires a value on input.
    pub require_values: bool,
    /// Type map used by fields declared with this class as their type.
    pub type_map: Option<TypeMapping>,
    /// Methods invoked after the object has been populated.
    pub post_load: Vec<String>,
    /// The class exports and imports itself through a plain map.
    pub native: bool,
}

impl ClassDescriptor {
    /// Starts building a class descriptor.
    pub fn builder(name: &'static str) -> ClassBuilder {
        ClassBuilder {
            class: ClassDescriptor {
                name,
                fields: Vec::new(),
                include_fields_by_default: true,
                scopes: None,
                require_values: false,
                type_map: None,
                post_load: Vec::new(),
                native: false,
            },
            rename: None,
            pending: Vec::new(),
        }
    }

    /// Looks a field up by property name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks the descriptor for contradictions.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut names = BTreeSet::new();
        let mut numbers = BTreeSet::new();

        for field in &self.fields {
            let needs_type_name = match field.field_type {
                FieldType::Enum(_) => true,
                FieldType::Object => field.type_map.is_none(),
                _ => false,
            };
            if needs_type_name && field.type_name.is_none() {
                return Err(SchemaError::MissingTypeName {
                    class: self.name,
                    field: field.name.clone(),
                });
            }

            if field.flatten && !matches!(field.field_type, FieldType::Object | FieldType::Array) {
                return Err(SchemaError::InvalidFlatten {
                    class: self.name,
                    field: field.name.clone(),
                    field_type: field.field_type,
                });
            }

            if let Some(refinement) = &field.refinement
                && !refinement.applies_to(field.field_type, field.type_name)
            {
                return Err(SchemaError::IncompatibleRefinement {
                    class: self.name,
                    field: field.name.clone(),
                    refinement: refinement.name(),
                    field_type: field.field_type,
                });
            }

            if !field.exclude && !field.flatten && !names.insert(field.serialized_name.as_str()) {
                return Err(SchemaError::DuplicateSerializedName {
                    class: self.name,
                    name: field.serialized_name.clone(),
                });
            }

            if let Some(number) = field.field_number
                && !numbers.insert(number)
            {
                return Err(SchemaError::DuplicateFieldNumber {
                    class: self.name,
                    number,
                });
            }
        }
        Ok(())
    }

    /// The descriptor as seen under a set of active scopes.
    ///
    /// Excluded fields are always dropped. A class that excludes fields by
    /// default keeps only fields that are included explicitly, through
    /// [`FieldBuilder::include`] or scopes of their own, scoped call or not.
    /// With scopes active, a field stays when its own scopes (or the
    /// class's, if it has none) intersect the active set.
    pub fn for_scopes(&self, active: &[String]) -> ClassDescriptor {
        let mut class = self.clone();
        class.fields.retain(|field| {
            if field.exclude {
                return false;
            }
            let declared =
                self.include_fields_by_default || field.include || field.scopes.is_some();
            if active.is_empty() {
                return declared;
            }
            match field.scopes.as_ref().or(self.scopes.as_ref()) {
                Some(scopes) => declared && scopes.iter().any(|s| active.contains(s)),
                None => declared,
            }
        });
        class
    }
}

/// Builder for [`ClassDescriptor`].
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    class: ClassDescriptor,
    rename: Option<RenameRule>,
    pending: Vec<FieldBuilder>,
}

impl ClassBuilder {
    /// Adds a field.
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.pending.push(field);
        self
    }

    /// Renames every field that has no explicit name or rule of its own.
    pub fn rename_all(mut self, rule: RenameRule) -> Self {
        self.rename = Some(rule);
        self
    }

    /// Whether fields appear without being included explicitly.
    pub fn include_fields_by_default(mut self, include: bool) -> Self {
        self.class.include_fields_by_default = include;
        self
    }

    /// Scopes applied to fields that declare none.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Requires a value for every field.
    pub fn require_values(mut self) -> Self {
        self.class.require_values = true;
        self
    }

    /// Type map for fields typed with this class.
    pub fn type_map(mut self, map: impl Into<TypeMapping>) -> Self {
        self.class.type_map = Some(map.into());
        self
    }

    /// Adds a post-load method.
    pub fn post_load(mut self, method: impl Into<String>) -> Self {
        self.class.post_load.push(method.into());
        self
    }

    /// Marks the class as serializing itself.
    pub fn native(mut self) -> Self {
        self.class.native = true;
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> ClassDescriptor {
        let ClassBuilder {
            mut class,
            rename,
            pending,
        } = self;
        class.fields = pending
            .into_iter()
            .map(|field| field.default_rename(rename).build())
            .collect();
        class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateField, ScalarKind, TypeRefinement};

    fn scoped() -> ClassDescriptor {
        ClassDescriptor::builder("Versioned")
            .field(FieldDescriptor::scalar("id", ScalarKind::Int))
            .field(FieldDescriptor::scalar("legacy", ScalarKind::String).scopes(["v1"]))
            .field(FieldDescriptor::scalar("modern", ScalarKind::String).scopes(["v2"]))
            .field(FieldDescriptor::scalar("secret", ScalarKind::String).exclude())
            .build()
    }

    fn names(class: &ClassDescriptor) -> Vec<&str> {
        class.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn unscoped_view_keeps_everything_but_excluded() {
        assert_eq!(names(&scoped().for_scopes(&[])), ["id", "legacy", "modern"]);
    }

    #[test]
    fn scoped_view_keeps_matching_and_default_fields() {
        let v1 = scoped().for_scopes(&["v1".into()]);
        assert_eq!(names(&v1), ["id", "legacy"]);

        let mut strict = scoped();
        strict.include_fields_by_default = false;
        assert_eq!(names(&strict.for_scopes(&["v2".into()])), ["modern"]);
    }

    #[test]
    fn opt_in_classes_keep_only_included_fields() {
        let class = ClassDescriptor::builder("Ledger")
            .include_fields_by_default(false)
            .field(FieldDescriptor::scalar("id", ScalarKind::Int).include())
            .field(FieldDescriptor::scalar("cache", ScalarKind::String))
            .field(FieldDescriptor::scalar("audit", ScalarKind::String).scopes(["admin"]))
            .build();
        assert_eq!(names(&class.for_scopes(&[])), ["id", "audit"]);
        assert_eq!(names(&class.for_scopes(&["admin".into()])), ["id", "audit"]);
        assert_eq!(names(&class.for_scopes(&["public".into()])), ["id"]);
    }

    #[test]
    fn class_scopes_apply_to_unscoped_fields() {
        let class = ClassDescriptor::builder("Internal")
            .scopes(["admin"])
            .field(FieldDescriptor::scalar("id", ScalarKind::Int))
            .field(FieldDescriptor::scalar("name", ScalarKind::String).scopes(["public"]))
            .build();
        assert_eq!(names(&class.for_scopes(&["admin".into()])), ["id"]);
        assert_eq!(names(&class.for_scopes(&["public".into()])), ["name"]);
    }

    #[test]
    fn rename_all_yields_to_field_rules() {
        let class = ClassDescriptor::builder("Person")
            .rename_all(RenameRule::SnakeCase)
            .field(FieldDescriptor::scalar("firstName", ScalarKind::String))
            .field(FieldDescriptor::scalar("lastName", ScalarKind::String).rename(RenameRule::Uppercase))
            .field(FieldDescriptor::scalar("nickName", ScalarKind::String).serialized_name("nick"))
            .build();
        let serialized: Vec<_> = class.fields.iter().map(|f| f.serialized_name.as_str()).collect();
        assert_eq!(serialized, ["first_name", "LASTNAME", "nick"]);
    }

    #[test]
    fn validation_catches_contradictions() {
        let flattened_scalar = ClassDescriptor::builder("A")
            .field(FieldDescriptor::scalar("x", ScalarKind::Int).flatten())
            .build();
        assert!(matches!(
            flattened_scalar.validate(),
            Err(SchemaError::InvalidFlatten { .. })
        ));

        let untyped_object = ClassDescriptor::builder("B")
            .field(FieldDescriptor::builder("child", FieldType::Object))
            .build();
        assert!(matches!(
            untyped_object.validate(),
            Err(SchemaError::MissingTypeName { .. })
        ));

        let misplaced = ClassDescriptor::builder("C")
            .field(
                FieldDescriptor::scalar("when", ScalarKind::String)
                    .refine(TypeRefinement::Date(DateField::default())),
            )
            .build();
        assert!(matches!(
            misplaced.validate(),
            Err(SchemaError::IncompatibleRefinement { refinement: "date", .. })
        ));

        let duplicated = ClassDescriptor::builder("D")
            .field(FieldDescriptor::scalar("a", ScalarKind::Int).serialized_name("x"))
            .field(FieldDescriptor::scalar("b", ScalarKind::Int).serialized_name("x"))
            .build();
        assert_eq!(
            duplicated.validate(),
            Err(SchemaError::DuplicateSerializedName {
                class: "D",
                name: "x".into()
            })
        );
    }
}
