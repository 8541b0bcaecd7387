#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
//! Format-agnostic, metadata-driven serialization.
//!
//! A [`Tessera`] engine walks objects through their [`Reflect`]
//! implementation and [`ClassDescriptor`], passing every field through an
//! ordered chain of [`Exporter`]s. The exporters call into a [`Formatter`],
//! which only ever sees scalars and collections. Deserialization mirrors
//! this with [`Importer`]s and a [`Deformatter`].
//!
//! Everything from `tessera-core` is re-exported here.

extern crate alloc;

mod deserializer;
mod engine;
mod error;
mod format;
mod handler;
mod options;
mod serializer;

pub use deserializer::Deserializer;
pub use engine::Tessera;
pub use error::{DeserializeError, FormatError, SerializeError};
pub use format::{DecodedKind, Deformatter, Formatter};
pub use handler::{CustomExporter, CustomImporter, Exporter, Importer};
pub use options::{DEFAULT_MAX_DEPTH, DeserializeOptions, SerializeOptions};
pub use serializer::Serializer;
pub use tessera_core::*;
