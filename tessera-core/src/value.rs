//! Dynamic values exchanged between objects, handlers and formats.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::ops::Deref;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::{Reflect, ReflectEnum, ReflectError};

/// An object shared between several owners, possibly forming a cycle.
pub type SharedObject = Arc<RwLock<dyn Reflect>>;

/// The key of a dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// An integer key.
    Int(i64),
    /// A string key.
    String(String),
}

impl Key {
    /// Returns the key as an integer, parsing canonical numeric strings.
    ///
    /// `"12"` converts, `"012"` and `"1e3"` do not.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            Key::String(s) => s.parse::<i64>().ok().filter(|i| i.to_string() == *s),
        }
    }

    /// Returns the string form of this key.
    pub fn to_name(&self) -> String {
        match self {
            Key::Int(i) => i.to_string(),
            Key::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.into())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

/// A case of a registered enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// The enum's registered name.
    pub type_name: &'static str,
    /// The case name.
    pub case: String,
}

/// The shape of a [`Value`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Null`]
    Null,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Int`]
    Int,
    /// [`Value::Float`]
    Float,
    /// [`Value::String`]
    String,
    /// [`Value::Enum`]
    Enum,
    /// [`Value::DateTime`]
    DateTime,
    /// [`Value::Sequence`]
    Sequence,
    /// [`Value::Dict`]
    Dict,
    /// [`Value::Object`]
    Object,
}

impl ValueKind {
    /// Lowercase name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Enum => "enum",
            ValueKind::DateTime => "datetime",
            ValueKind::Sequence => "sequence",
            ValueKind::Dict => "dictionary",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically-typed value.
///
/// Objects read their properties into values, handlers turn values into
/// format calls, and deserialization produces values that are written back
/// into freshly instantiated objects.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent or explicit null.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A double-precision float.
    Float(f64),
    /// A string.
    String(String),
    /// A case of a registered enum.
    Enum(EnumValue),
    /// A point in time.
    DateTime(DateTime<FixedOffset>),
    /// An ordered list.
    Sequence(Vec<Value>),
    /// An ordered map.
    Dict(IndexMap<Key, Value>),
    /// A reflected object.
    Object(ObjectRef),
}

impl Value {
    /// Wraps an owned object.
    pub fn object<T: Reflect>(object: T) -> Self {
        Value::Object(ObjectRef::Owned(Box::new(object)))
    }

    /// Wraps a shared object, keeping its identity.
    pub fn shared(object: SharedObject) -> Self {
        Value::Object(ObjectRef::Shared(object))
    }

    /// Wraps an enum case.
    pub fn enumeration<E: ReflectEnum>(case: &E) -> Self {
        Value::Enum(EnumValue {
            type_name: E::TYPE_NAME,
            case: case.case_name().into(),
        })
    }

    /// The shape of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Enum(_) => ValueKind::Enum,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Dict(_) => ValueKind::Dict,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this is a bool, int, float or string.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// Borrows the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrows the object, if this is one.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Describes this value for error messages: its kind, or an object's type.
    pub fn describe(&self) -> String {
        match self {
            Value::Object(o) => o.type_name().into(),
            Value::Enum(e) => e.type_name.into(),
            other => other.kind().name().into(),
        }
    }

    /// Converts an object value into a concrete type.
    ///
    /// Owned objects are moved out; shared objects are cloned.
    pub fn into_object<T: Reflect + Clone>(self) -> Result<T, ReflectError> {
        match self {
            Value::Object(object) => object.into_concrete(),
            other => Err(ReflectError::wrong_type(
                core::any::type_name::<T>(),
                other.describe(),
            )),
        }
    }

    /// Converts an object value into a shared handle.
    ///
    /// Owned objects are moved into a fresh lock. A shared object of another
    /// concrete type is rejected.
    pub fn into_shared<T: Reflect + Clone>(self) -> Result<Arc<RwLock<T>>, ReflectError> {
        self.into_object::<T>().map(|t| Arc::new(RwLock::new(t)))
    }

    /// Converts an enum value into a concrete enum.
    pub fn into_enum<E: ReflectEnum>(self) -> Result<E, ReflectError> {
        match self {
            Value::Enum(EnumValue { case, .. }) | Value::String(case) => E::from_case_name(&case)
                .ok_or_else(|| ReflectError::wrong_type(E::TYPE_NAME, case)),
            other => Err(ReflectError::wrong_type(E::TYPE_NAME, other.describe())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.identity() == b.identity(),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// A reference to a reflected object held by a [`Value`].
pub enum ObjectRef {
    /// An object with a single owner.
    Owned(Box<dyn Reflect>),
    /// An object that may be reachable from several places.
    Shared(SharedObject),
}

/// A read borrow of the object behind an [`ObjectRef`].
pub enum ObjectGuard<'a> {
    /// Borrow of an owned object.
    Owned(&'a dyn Reflect),
    /// Read lock on a shared object.
    Shared(RwLockReadGuard<'a, dyn Reflect>),
}

impl Deref for ObjectGuard<'_> {
    type Target = dyn Reflect;

    fn deref(&self) -> &Self::Target {
        match self {
            ObjectGuard::Owned(object) => *object,
            ObjectGuard::Shared(guard) => &**guard,
        }
    }
}

impl ObjectRef {
    /// Borrows the object for reading.
    ///
    /// Shared objects take a recursive read lock so that cycles can be walked
    /// without deadlocking.
    pub fn borrow(&self) -> ObjectGuard<'_> {
        match self {
            ObjectRef::Owned(object) => ObjectGuard::Owned(&**object),
            ObjectRef::Shared(object) => ObjectGuard::Shared(object.read_recursive()),
        }
    }

    /// The object's registered type name.
    pub fn type_name(&self) -> &'static str {
        self.borrow().type_name()
    }

    /// The address of the object, stable for as long as it is alive.
    pub fn identity(&self) -> usize {
        identity(&*self.borrow())
    }

    /// Extracts a boxed object, cloning it out of a shared handle.
    pub fn into_boxed(self) -> Box<dyn Reflect> {
        match self {
            ObjectRef::Owned(object) => object,
            ObjectRef::Shared(object) => object.read_recursive().clone_boxed(),
        }
    }

    fn into_concrete<T: Reflect + Clone>(self) -> Result<T, ReflectError> {
        let found = self.type_name();
        match self {
            ObjectRef::Owned(object) => {
                let any: Box<dyn Any> = object;
                any.downcast::<T>()
                    .map(|t| *t)
                    .map_err(|_| ReflectError::wrong_type(core::any::type_name::<T>(), found))
            }
            ObjectRef::Shared(object) => {
                let guard = object.read_recursive();
                let any: &dyn Any = &*guard;
                any.downcast_ref::<T>()
                    .cloned()
                    .ok_or_else(|| ReflectError::wrong_type(core::any::type_name::<T>(), found))
            }
        }
    }
}

impl Clone for ObjectRef {
    fn clone(&self) -> Self {
        match self {
            ObjectRef::Owned(object) => ObjectRef::Owned(object.clone_boxed()),
            ObjectRef::Shared(object) => ObjectRef::Shared(Arc::clone(object)),
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Owned(_) => write!(f, "Owned({})", self.type_name()),
            ObjectRef::Shared(_) => write!(f, "Shared({}@{:#x})", self.type_name(), self.identity()),
        }
    }
}

/// The address of a reflected object, used to detect cycles.
pub fn identity(object: &dyn Reflect) -> usize {
    object as *const dyn Reflect as *const () as usize
}

/// Converts a Rust value into a [`Value`].
pub trait ToValue {
    /// Performs the conversion.
    fn to_value(&self) -> Value;
}

/// Converts a [`Value`] back into a Rust value.
pub trait FromValue: Sized {
    /// Performs the conversion.
    fn from_value(value: Value) -> Result<Self, ReflectError>;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        Ok(value)
    }
}

macro_rules! int_conversions {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ReflectError> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i).map_err(|_| ReflectError::OutOfRange {
                            value: i.to_string(),
                            target: stringify!($ty),
                        }),
                        other => Err(ReflectError::wrong_type("int", other.describe())),
                    }
                }
            }
        )*
    };
}

int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        value
            .as_float()
            .ok_or_else(|| ReflectError::wrong_type("float", value.describe()))
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        value
            .as_bool()
            .ok_or_else(|| ReflectError::wrong_type("bool", value.describe()))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.into())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(ReflectError::wrong_type("string", other.describe())),
        }
    }
}

impl ToValue for DateTime<FixedOffset> {
    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(ReflectError::wrong_type("datetime", other.describe())),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(t) => t.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::from_value).collect(),
            Value::Dict(map) => map.into_values().map(T::from_value).collect(),
            other => Err(ReflectError::wrong_type("sequence", other.describe())),
        }
    }
}

impl<T: ToValue> ToValue for IndexMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Dict(
            self.iter()
                .map(|(k, v)| (Key::String(k.clone()), v.to_value()))
                .collect(),
        )
    }
}

impl<T: FromValue> FromValue for IndexMap<String, T> {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        match value {
            Value::Dict(map) => map
                .into_iter()
                .map(|(k, v)| Ok((k.to_name(), T::from_value(v)?)))
                .collect(),
            Value::Sequence(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| Ok((i.to_string(), T::from_value(v)?)))
                .collect(),
            other => Err(ReflectError::wrong_type("dictionary", other.describe())),
        }
    }
}

impl<T: ToValue> ToValue for IndexMap<i64, T> {
    fn to_value(&self) -> Value {
        Value::Dict(self.iter().map(|(k, v)| (Key::Int(*k), v.to_value())).collect())
    }
}

impl<T: FromValue> FromValue for IndexMap<i64, T> {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        match value {
            Value::Dict(map) => map
                .into_iter()
                .map(|(k, v)| {
                    let key = k
                        .as_int()
                        .ok_or_else(|| ReflectError::wrong_type("int key", k.to_name()))?;
                    Ok((key, T::from_value(v)?))
                })
                .collect(),
            other => Err(ReflectError::wrong_type("dictionary", other.describe())),
        }
    }
}

impl<T: Reflect + Clone> ToValue for Arc<RwLock<T>> {
    fn to_value(&self) -> Value {
        let shared: SharedObject = Arc::clone(self) as SharedObject;
        Value::shared(shared)
    }
}

impl<T: Reflect + Clone> FromValue for Arc<RwLock<T>> {
    fn from_value(value: Value) -> Result<Self, ReflectError> {
        value.into_shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_string_keys_convert_only_when_canonical() {
        assert_eq!(Key::from("12").as_int(), Some(12));
        assert_eq!(Key::from("-3").as_int(), Some(-3));
        assert_eq!(Key::from("012").as_int(), None);
        assert_eq!(Key::from("1e3").as_int(), None);
        assert_eq!(Key::from("twelve").as_int(), None);
        assert_eq!(Key::Int(7).to_name(), "7");
    }

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(u8::from_value(Value::Int(255)), Ok(255));
        assert!(matches!(
            u8::from_value(Value::Int(256)),
            Err(ReflectError::OutOfRange { target: "u8", .. })
        ));
        assert!(matches!(
            i32::from_value(Value::String("1".into())),
            Err(ReflectError::WrongType { expected: "int", .. })
        ));
    }

    #[test]
    fn options_map_null() {
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
        assert_eq!(Option::<i64>::from_value(Value::Int(3)), Ok(Some(3)));
        assert_eq!(None::<String>.to_value(), Value::Null);
    }

    #[test]
    fn sequences_accept_dictionaries() {
        let mut map = IndexMap::new();
        map.insert(Key::from("a"), Value::Int(1));
        map.insert(Key::from("b"), Value::Int(2));
        assert_eq!(Vec::<i64>::from_value(Value::Dict(map)), Ok(vec![1, 2]));
    }

    #[test]
    fn floats_widen_integers() {
        assert_eq!(f64::from_value(Value::Int(2)), Ok(2.0));
        assert_eq!(Value::Int(2).as_float(), Some(2.0));
    }
}
