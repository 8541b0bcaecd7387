#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
//! In-memory array format for tessera.
//!
//! Objects are written to and read from a tree of [`Value`]s: objects are
//! string-keyed dictionaries, lists are sequences, scalars stay scalars.
//! Fields are looked up by name, so this format can hand unclaimed keys to
//! collecting fields, and it can tell what a mixed field holds by looking
//! at the value.
//!
//! ```ignore
//! let tessera = Tessera::new(registry);
//! let value = tessera_array::to_value(&tessera, &person)?;
//! let back: Person = tessera_array::from_value(&tessera, value)?;
//!
//! let text = tessera_array::json::to_string(&tessera, &person)?;
//! let back: Person = tessera_array::json::from_str(&tessera, &text)?;
//! ```

extern crate alloc;

mod deserialize;
pub mod json;
mod serialize;

pub use deserialize::{ArrayDecoded, ArrayDeformatter};
pub use json::JsonError;
pub use serialize::{ArrayBuffer, ArrayFormatter};

use tessera::{DeserializeError, Describe, Reflect, SerializeError, Tessera, Value};

/// Serializes an object to a value tree.
pub fn to_value(tessera: &Tessera, object: &dyn Reflect) -> Result<Value, SerializeError> {
    tessera.serialize(&ArrayFormatter, object)
}

/// Deserializes an object of type `T` from a value tree.
pub fn from_value<T: Describe>(tessera: &Tessera, value: Value) -> Result<T, DeserializeError> {
    tessera.deserialize(&ArrayDeformatter, value)
}
