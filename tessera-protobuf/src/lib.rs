#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
//! Protobuf-style binary wire format for tessera.
//!
//! No `.proto` file is involved: field numbers are handed out in field
//! declaration order, starting at 1, unless a field pins its own number.
//! Integers and floats are encoded as their field's
//! [`IntEncoding`](tessera::IntEncoding) or
//! [`FloatEncoding`](tessera::FloatEncoding) says.
//!
//! ```ignore
//! let tessera = Tessera::new(registry);
//! let bytes = tessera_protobuf::to_vec(&tessera, &person)?;
//! let back: Person = tessera_protobuf::from_slice(&tessera, &bytes)?;
//! ```
//!
//! Map fields are written as repeated entries whose key is field 1 and
//! value is field 2. Repeated scalars are written unpacked and read back in
//! either form. Null values write nothing but still take a field number.

extern crate alloc;

mod deserialize;
mod error;
mod numbering;
mod serialize;
pub mod varint;
pub mod wire;

use alloc::vec::Vec;

pub use deserialize::{ProtobufDeformatter, ProtobufMessage, RawValue};
pub use error::{ProtobufError, ProtobufErrorKind};
pub use numbering::FieldNumbers;
pub use serialize::{ProtobufBuffer, ProtobufFormatter};
pub use wire::WireType;

use tessera::{DeserializeError, Describe, Reflect, SerializeError, Tessera};

/// Serializes an object to protobuf bytes.
pub fn to_vec(tessera: &Tessera, object: &dyn Reflect) -> Result<Vec<u8>, SerializeError> {
    tessera.serialize(&ProtobufFormatter, object)
}

/// Deserializes an object of type `T` from protobuf bytes.
pub fn from_slice<T: Describe>(tessera: &Tessera, bytes: &[u8]) -> Result<T, DeserializeError> {
    tessera.deserialize(&ProtobufDeformatter, bytes)
}
