//! Defines the `ExtensionRegistry`, a collection of extension identifiers grouped by the message they extend.
//!
//! A registry is an explicit value. Build one with a [`RegistryBuilder`], then pass it to whatever
//! creates messages so their extension sets can be populated before any data is read.

use std::any::TypeId;
use std::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use log::debug;
use thiserror::Error;
use crate::io::FieldNumber;
use super::{same_identifier, ExtendableMessage, ExtensionError, ExtensionIdentifier};

/// The error returned when two different extensions of the same message are added to a
/// registry builder with the same field number
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("an extension with field number {0} was already added for this message")]
pub struct ExtensionConflict(FieldNumber);

impl ExtensionConflict {
    /// Gets the field number both extensions use
    pub fn field_number(&self) -> FieldNumber {
        self.0
    }
}

/// A builder used to construct extension registries
#[derive(Default)]
pub struct RegistryBuilder {
    by_type: HashMap<TypeId, Vec<&'static dyn ExtensionIdentifier>>,
}

impl RegistryBuilder {
    /// Creates a new registry builder for building an extension registry
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds an extension identifier to this registry. Adding the same identifier twice does nothing.
    pub fn add_identifier(mut self, id: &'static dyn ExtensionIdentifier) -> Result<Self, ExtensionConflict> {
        let num = id.field_number();
        let ids = self.by_type.entry(id.target_type()).or_insert_with(Vec::new);
        let existing = ids.iter().find(|existing| existing.field_number() == num).copied();
        match existing {
            Some(existing) if same_identifier(existing, id) => { },
            Some(_) => return Err(ExtensionConflict(num)),
            None => ids.push(id),
        }
        Ok(self)
    }

    /// Adds the extensions in the specified registry to this registry
    pub fn add_registry(mut self, registry: &ExtensionRegistry) -> Result<Self, ExtensionConflict> {
        for ids in registry.by_type.values() {
            for &id in ids {
                self = self.add_identifier(id)?;
            }
        }
        Ok(self)
    }

    /// Returns the extension registry
    pub fn build(self) -> ExtensionRegistry {
        let registry = ExtensionRegistry { by_type: self.by_type };
        debug!("built extension registry with {} extensions for {} messages", registry.len(), registry.by_type.len());
        registry
    }
}

/// A registry of extension identifiers, used to register every known extension with a message up front
#[derive(Default)]
pub struct ExtensionRegistry {
    by_type: HashMap<TypeId, Vec<&'static dyn ExtensionIdentifier>>,
}

impl ExtensionRegistry {
    /// Creates a new builder for a registry
    #[inline]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Gets the extensions for the message type `T` in the order they were added
    pub fn extensions_for<T: ExtendableMessage>(&self) -> &[&'static dyn ExtensionIdentifier] {
        match self.by_type.get(&TypeId::of::<T>()) {
            Some(ids) => ids,
            None => &[],
        }
    }

    /// Gets the extensions for the message type `T` sorted by field number
    pub fn extensions_for_in_number_order<T: ExtendableMessage>(&self) -> Vec<&'static dyn ExtensionIdentifier> {
        let mut ids = self.extensions_for::<T>().to_vec();
        ids.sort_by_key(|id| id.field_number());
        ids
    }

    /// Finds the extension of `T` with the specified field number
    pub fn find<T: ExtendableMessage>(&self, num: FieldNumber) -> Option<&'static dyn ExtensionIdentifier> {
        self.extensions_for::<T>()
            .iter()
            .copied()
            .find(|id| id.field_number() == num)
    }

    /// Returns whether the registry contains the extension
    pub fn contains(&self, id: &dyn ExtensionIdentifier) -> bool {
        self.by_type
            .get(&id.target_type())
            .map_or(false, |ids| ids.iter().any(|&existing| same_identifier(existing, id)))
    }

    /// Registers every extension for `T` in the registry with the message's extensions
    pub fn register_extensions_for<T: ExtendableMessage>(&self, message: &mut T) -> Result<(), ExtensionError> {
        let extensions = message.extensions_mut();
        for &id in self.extensions_for::<T>() {
            extensions.try_register(id)?;
        }
        Ok(())
    }

    /// Gets the total number of extensions in the registry
    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    /// Returns if the registry has no extensions
    pub fn is_empty(&self) -> bool {
        self.by_type.values().all(Vec::is_empty)
    }
}

impl Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list()
            .entries(self.by_type.values().flatten().map(|id| (id.target_type_name(), id.field_number())))
            .finish()
    }
}
