//! The entry point tying a registry to the handler chains.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use tessera_core::{Describe, Reflect, Registry};

use crate::handler::{CustomExporter, CustomImporter, Exporter, Importer};
use crate::{
    DEFAULT_MAX_DEPTH, DeserializeError, DeserializeOptions, Deformatter, Deserializer,
    Formatter, SerializeError, SerializeOptions, Serializer,
};

/// Serializes and deserializes registered types with any format.
///
/// ```ignore
/// let mut registry = Registry::new();
/// registry.register::<Person>()?;
/// let tessera = Tessera::new(registry);
///
/// let value = tessera.serialize(&ArrayFormatter, &person)?;
/// let back: Person = tessera.deserialize(&ArrayDeformatter, value)?;
/// ```
#[derive(Debug, Clone)]
pub struct Tessera {
    registry: Arc<Registry>,
    exporters: Vec<Exporter>,
    importers: Vec<Importer>,
    max_depth: usize,
}

impl Tessera {
    /// An engine with the built-in handlers.
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        Tessera {
            registry: registry.into(),
            exporters: Exporter::defaults(),
            importers: Importer::defaults(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the default object-graph depth limit.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Puts a custom exporter in front of every other exporter.
    pub fn with_exporter(mut self, exporter: impl CustomExporter + 'static) -> Self {
        self.exporters.insert(0, Exporter::Custom(Arc::new(exporter)));
        self
    }

    /// Puts a custom importer in front of every other importer.
    pub fn with_importer(mut self, importer: impl CustomImporter + 'static) -> Self {
        self.importers.insert(0, Importer::Custom(Arc::new(importer)));
        self
    }

    /// The registry metadata is read from.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The export chain, in priority order.
    pub fn exporters(&self) -> &[Exporter] {
        &self.exporters
    }

    /// The import chain, in priority order.
    pub fn importers(&self) -> &[Importer] {
        &self.importers
    }

    /// Serializes an object.
    pub fn serialize<F: Formatter>(
        &self,
        formatter: &F,
        object: &dyn Reflect,
    ) -> Result<F::Output, SerializeError> {
        self.serialize_with(formatter, object, &SerializeOptions::default())
    }

    /// Serializes an object with per-call options.
    pub fn serialize_with<F: Formatter>(
        &self,
        formatter: &F,
        object: &dyn Reflect,
        options: &SerializeOptions,
    ) -> Result<F::Output, SerializeError> {
        Serializer::new(
            formatter,
            &self.registry,
            &self.exporters,
            &options.scopes,
            options.max_depth.unwrap_or(self.max_depth),
        )
        .serialize_root(object)
    }

    /// Deserializes an object of type `T`.
    pub fn deserialize<T: Describe, D: Deformatter>(
        &self,
        deformatter: &D,
        input: D::Input<'_>,
    ) -> Result<T, DeserializeError> {
        self.deserialize_with(deformatter, input, &DeserializeOptions::default())
    }

    /// Deserializes an object of type `T` with per-call options.
    pub fn deserialize_with<T: Describe, D: Deformatter>(
        &self,
        deformatter: &D,
        input: D::Input<'_>,
        options: &DeserializeOptions,
    ) -> Result<T, DeserializeError> {
        let object = self.deserialize_dyn(deformatter, input, T::TYPE_NAME, options)?;
        let found = object.type_name();
        let any: Box<dyn Any> = object;
        any.downcast::<T>()
            .map(|object| *object)
            .map_err(|_| DeserializeError::UnexpectedType {
                expected: T::TYPE_NAME,
                found,
            })
    }

    /// Deserializes an object of a type known only by name.
    ///
    /// With a type map governing `type_name`, the result is whichever class
    /// the input's discriminator names.
    pub fn deserialize_dyn<D: Deformatter>(
        &self,
        deformatter: &D,
        input: D::Input<'_>,
        type_name: &'static str,
        options: &DeserializeOptions,
    ) -> Result<Box<dyn Reflect>, DeserializeError> {
        let mut decoded = deformatter.init(input)?;
        let object = Deserializer::new(
            deformatter,
            &self.registry,
            &self.importers,
            &options.scopes,
            options.max_depth.unwrap_or(self.max_depth),
        )
        .deserialize_root(&mut decoded, type_name)?;
        deformatter.finalize(decoded)?;
        Ok(object)
    }
}
