#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
//! Core types for tessera: the metadata that describes classes and fields,
//! the dynamic [`Value`] model, the [`Reflect`] object model, type maps and
//! the [`Registry`] tying them together.
//!
//! Formats never see user types directly. The serializer reads objects
//! through [`Reflect`] into [`Value`]s, guided by [`ClassDescriptor`]s, and
//! hands formats [`Sequence`]s and [`Dict`]s whose items carry their own
//! [`FieldDescriptor`].

extern crate alloc;

mod class;
mod coerce;
mod collection;
mod enums;
mod error;
mod field;
mod macros;
mod reflect;
mod registry;
mod rename;
mod typemap;
mod value;

/// The lock behind [`SharedObject`].
pub use parking_lot::RwLock;

pub use class::{ClassBuilder, ClassDescriptor};
pub use coerce::{Mismatch, coerce};
pub use collection::{CollectionItem, Dict, Sequence};
pub use enums::{Backing, EnumCase, EnumDescriptor};
pub use error::{ReflectError, SchemaError};
pub use field::{
    DATE_TIME, DateField, DictionaryField, ElementType, EnumKind, FieldBuilder, FieldDescriptor,
    FieldType, FloatEncoding, IntEncoding, KeyType, MixedField, NumberField, ScalarKind,
    SequenceField, TimeResolution, TypeRefinement, UnixTimeField,
};
pub use reflect::{Describe, Reflect, ReflectClone, ReflectEnum};
pub use registry::Registry;
pub use rename::RenameRule;
pub use typemap::{ClassNameTypeMap, StaticTypeMap, TypeMap, TypeMapping};
pub use value::{
    EnumValue, FromValue, Key, ObjectGuard, ObjectRef, SharedObject, ToValue, Value, ValueKind,
    identity,
};
