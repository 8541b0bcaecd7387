//! The object model: how tessera reads, writes and creates user types.

use alloc::boxed::Box;
use alloc::string::String;
use core::any::Any;
use core::fmt;

use indexmap::IndexMap;

use crate::{ClassDescriptor, EnumDescriptor, ReflectError, Value};

/// A type whose properties can be read and written by name.
///
/// `get` returns `None` for a property that has never been initialized,
/// which the serializer treats the same as null.
pub trait Reflect: Any + Send + Sync + ReflectClone {
    /// The name this type is registered under.
    fn type_name(&self) -> &'static str;

    /// Reads a property.
    fn get(&self, property: &str) -> Option<Value>;

    /// Writes a property.
    fn set(&mut self, property: &str, value: Value) -> Result<(), ReflectError>;

    /// Calls a post-load method by name.
    fn invoke(&mut self, method: &str) -> Result<(), ReflectError> {
        Err(ReflectError::NoSuchMethod {
            type_name: self.type_name(),
            method: method.into(),
        })
    }

    /// Exports the object as a plain map, for classes marked native.
    fn native_serialize(&self) -> Option<IndexMap<String, Value>> {
        None
    }

    /// Restores the object from a plain map, for classes marked native.
    fn native_unserialize(&mut self, data: IndexMap<String, Value>) -> Result<(), ReflectError> {
        let _ = data;
        Err(ReflectError::Unsupported {
            type_name: self.type_name(),
            operation: "native unserialization",
        })
    }
}

/// Clones a reflected object behind a box.
///
/// Implemented for every `Reflect + Clone` type.
pub trait ReflectClone {
    /// Clones `self` into a new box.
    fn clone_boxed(&self) -> Box<dyn Reflect>;
}

impl<T: Reflect + Clone> ReflectClone for T {
    fn clone_boxed(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Reflect> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.type_name())
    }
}

/// A reflected type that can describe itself and be created blank.
pub trait Describe: Reflect + Default {
    /// The name this type is registered under.
    const TYPE_NAME: &'static str;

    /// Builds the metadata for this type.
    fn describe() -> ClassDescriptor;

    /// Interfaces and parent types, used to find inherited type maps.
    fn supertypes() -> &'static [&'static str] {
        &[]
    }
}

/// A Rust enum exposed to tessera as a named set of cases.
pub trait ReflectEnum: Sized + 'static {
    /// The name this enum is registered under.
    const TYPE_NAME: &'static str;

    /// Builds the metadata for this enum.
    fn describe() -> EnumDescriptor;

    /// The name of this case.
    fn case_name(&self) -> &'static str;

    /// Looks a case up by name.
    fn from_case_name(name: &str) -> Option<Self>;
}
