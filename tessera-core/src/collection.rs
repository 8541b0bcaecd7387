//! Intermediate collections passed between the serializer and formats.
//!
//! Every item carries the field that describes it, so that a format can ask
//! the serializer to handle it without knowing where it came from.

use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::{FieldDescriptor, Key, Value};

/// One entry of a [`Sequence`] or [`Dict`].
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionItem {
    /// Position or name.
    pub key: Key,
    /// Field describing the value.
    pub field: FieldDescriptor,
    /// The value.
    pub value: Value,
}

/// An index-keyed list of items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    items: Vec<CollectionItem>,
}

impl Sequence {
    /// An empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item keyed by its position.
    pub fn push(&mut self, field: FieldDescriptor, value: Value) {
        let key = Key::Int(self.items.len() as i64);
        self.items.push(CollectionItem { key, field, value });
    }

    /// Iterates over the items.
    pub fn iter(&self) -> core::slice::Iter<'_, CollectionItem> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The values, in order.
    pub fn into_values(self) -> Vec<Value> {
        self.items.into_iter().map(|item| item.value).collect()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a CollectionItem;
    type IntoIter = core::slice::Iter<'a, CollectionItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A key-ordered list of items.
///
/// Keys are not deduplicated: an object dictionary may legitimately carry a
/// discriminator and a flattened child's fields side by side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict {
    items: Vec<CollectionItem>,
}

impl Dict {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item.
    pub fn push(&mut self, key: impl Into<Key>, field: FieldDescriptor, value: Value) {
        self.items.push(CollectionItem {
            key: key.into(),
            field,
            value,
        });
    }

    /// Iterates over the items.
    pub fn iter(&self) -> core::slice::Iter<'_, CollectionItem> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The entries as a map; a later key replaces an earlier one.
    pub fn into_map(self) -> IndexMap<Key, Value> {
        self.items
            .into_iter()
            .map(|item| (item.key, item.value))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = &'a CollectionItem;
    type IntoIter = core::slice::Iter<'a, CollectionItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Dict {
    type Item = CollectionItem;
    type IntoIter = alloc::vec::IntoIter<CollectionItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
