//! The type-erased cells stored in an [`ExtensionSet`](../struct.ExtensionSet.html).
//!
//! Generated code never touches these directly. Each registered extension owns exactly one cell,
//! created by its identifier, and the set talks to it only through [`AnyExtension`].

use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::hash::Hasher;
use std::ptr;
use crate::codec::FieldCodec;
use crate::collections::{RepeatedField, RepeatedValue};
use crate::io::{read, write, FieldNumber, LengthBuilder, CodedReader, CodedWriter};
use crate::raw::Value;

/// The object-safe operations an extension set performs on its cells.
pub trait AnyExtension: Any + Debug + Send + Sync {
    /// Gets the field number of the extension this cell holds
    fn field_number(&self) -> FieldNumber;
    /// Reads the field at the reader's last tag into the cell. Returns `false` without reading
    /// anything if the cell can't read the tag's wire type.
    fn merge_from_wire(&mut self, input: &mut CodedReader) -> read::Result<bool>;
    /// Merges another cell of the same kind into this one.
    ///
    /// # Panics
    ///
    /// Panics if `other` is a different kind of cell.
    fn merge(&mut self, other: &dyn AnyExtension);
    /// Writes the cell's tags and values
    fn write_to(&self, output: &mut CodedWriter) -> write::Result;
    /// Adds the size of the cell's tags and values to the builder
    fn calculate_size(&self, builder: LengthBuilder) -> Option<LengthBuilder>;
    /// Clones the cell and its value
    fn clone_box(&self) -> Box<dyn AnyExtension>;
    /// Compares two cells of the same kind.
    ///
    /// # Panics
    ///
    /// Panics if `other` is a different kind of cell.
    fn eq(&self, other: &dyn AnyExtension) -> bool;
    /// Feeds the cell's value into the hasher
    fn hash_value(&self, state: &mut dyn Hasher);
    /// Returns if the cell's value is initialized
    fn is_initialized(&self) -> bool;
    /// Returns if the cell holds a value
    fn has_value(&self) -> bool;
    /// Removes the cell's value
    fn clear(&mut self);

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;
    #[doc(hidden)]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

fn downcast<'a, C: Any>(other: &'a dyn AnyExtension, op: &str) -> &'a C {
    match other.as_any().downcast_ref::<C>() {
        Some(cell) => cell,
        None => panic!("cannot {} extension values of different kinds (field {})", op, other.field_number().get()),
    }
}

/// A cell holding a singular extension value
pub struct ExtensionValue<V: Value> {
    codec: &'static FieldCodec<V>,
    value: V::Inner,
    has: bool,
}

impl<V: Value> ExtensionValue<V> {
    pub(crate) fn new(codec: &'static FieldCodec<V>) -> Self {
        Self {
            codec,
            value: codec.default().clone(),
            has: false,
        }
    }

    /// Gets the value if one is present
    pub fn get(&self) -> Option<&V::Inner> {
        if self.has { Some(&self.value) } else { None }
    }

    /// Marks the value present and returns it
    pub fn get_mut(&mut self) -> &mut V::Inner {
        self.has = true;
        &mut self.value
    }

    /// Sets the value, marking it present
    pub fn set(&mut self, value: V::Inner) {
        self.value = value;
        self.has = true;
    }
}

impl<V: Value> Clone for ExtensionValue<V> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec,
            value: self.value.clone(),
            has: self.has,
        }
    }
}

impl<V: Value> Debug for ExtensionValue<V> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.get() {
            Some(value) => value.fmt(f),
            None => f.write_str("<unset>"),
        }
    }
}

impl<V: Value> AnyExtension for ExtensionValue<V> {
    fn field_number(&self) -> FieldNumber {
        self.codec.field_number()
    }
    fn merge_from_wire(&mut self, input: &mut CodedReader) -> read::Result<bool> {
        match input.last_tag() {
            Some(tag) if tag.wire_type() == V::WIRE_TYPE => {
                if self.has {
                    self.codec.merge_from(input, &mut self.value)?;
                } else {
                    self.value = self.codec.read(input)?;
                    self.has = true;
                }
                Ok(true)
            },
            _ => Ok(false),
        }
    }
    fn merge(&mut self, other: &dyn AnyExtension) {
        let other = downcast::<Self>(other, "merge");
        if let Some(value) = other.get() {
            if self.has {
                self.codec.merge(&mut self.value, value);
            } else {
                self.set(value.clone());
            }
        }
    }
    fn write_to(&self, output: &mut CodedWriter) -> write::Result {
        match self.get() {
            Some(value) => self.codec.force_write_tag_and_value(output, value),
            None => Ok(()),
        }
    }
    fn calculate_size(&self, builder: LengthBuilder) -> Option<LengthBuilder> {
        match self.get() {
            Some(value) => self.codec.force_calculate_size_with_tag(builder, value),
            None => Some(builder),
        }
    }
    fn clone_box(&self) -> Box<dyn AnyExtension> {
        Box::new(self.clone())
    }
    fn eq(&self, other: &dyn AnyExtension) -> bool {
        let other = downcast::<Self>(other, "compare");
        ptr::eq(self.codec, other.codec) &&
            match (self.get(), other.get()) {
                (Some(a), Some(b)) => V::value_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
    fn hash_value(&self, mut state: &mut dyn Hasher) {
        if let Some(value) = self.get() {
            V::hash_value(value, &mut state);
        }
    }
    fn is_initialized(&self) -> bool {
        self.get().map_or(true, V::is_initialized)
    }
    fn has_value(&self) -> bool {
        self.has
    }
    fn clear(&mut self) {
        self.value = self.codec.default().clone();
        self.has = false;
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A cell holding the values of a repeated extension
pub struct RepeatedExtensionValue<V: Value> {
    codec: &'static FieldCodec<V>,
    values: RepeatedField<V::Inner>,
}

impl<V: Value> RepeatedExtensionValue<V> {
    pub(crate) fn new(codec: &'static FieldCodec<V>) -> Self {
        Self { codec, values: RepeatedField::new() }
    }

    /// Gets the values in the cell
    pub fn values(&self) -> &RepeatedField<V::Inner> {
        &self.values
    }

    /// Gets the values in the cell mutably
    pub fn values_mut(&mut self) -> &mut RepeatedField<V::Inner> {
        &mut self.values
    }
}

impl<V: Value> Clone for RepeatedExtensionValue<V> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec,
            values: self.values.clone(),
        }
    }
}

impl<V: Value> Debug for RepeatedExtensionValue<V> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.values.fmt(f)
    }
}

impl<V: Value> AnyExtension for RepeatedExtensionValue<V> {
    fn field_number(&self) -> FieldNumber {
        self.codec.field_number()
    }
    fn merge_from_wire(&mut self, input: &mut CodedReader) -> read::Result<bool> {
        match input.last_tag() {
            Some(tag) if self.codec.accepts(tag.wire_type()) => {
                input.add_entries_to::<V, _>(&mut self.values)?;
                Ok(true)
            },
            _ => Ok(false),
        }
    }
    fn merge(&mut self, other: &dyn AnyExtension) {
        let other = downcast::<Self>(other, "merge");
        self.values.extend(other.values.iter().cloned());
    }
    fn write_to(&self, output: &mut CodedWriter) -> write::Result {
        RepeatedValue::<V>::write_to(&self.values, output, self.codec.tag())
    }
    fn calculate_size(&self, builder: LengthBuilder) -> Option<LengthBuilder> {
        RepeatedValue::<V>::calculate_size(&self.values, builder, self.codec.tag())
    }
    fn clone_box(&self) -> Box<dyn AnyExtension> {
        Box::new(self.clone())
    }
    fn eq(&self, other: &dyn AnyExtension) -> bool {
        let other = downcast::<Self>(other, "compare");
        ptr::eq(self.codec, other.codec) &&
            self.values.len() == other.values.len() &&
            self.values.iter().zip(&other.values).all(|(a, b)| V::value_eq(a, b))
    }
    fn hash_value(&self, mut state: &mut dyn Hasher) {
        state.write_usize(self.values.len());
        for value in &self.values {
            V::hash_value(value, &mut state);
        }
    }
    fn is_initialized(&self) -> bool {
        RepeatedValue::<V>::is_initialized(&self.values)
    }
    fn has_value(&self) -> bool {
        !self.values.is_empty()
    }
    fn clear(&mut self) {
        self.values.clear()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
