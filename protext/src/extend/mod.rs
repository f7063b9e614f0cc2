//! Contains types for protobuf extensions.
//!
//! Extensions are declared as statics of [`Extension`] or [`RepeatedExtension`] and identified by
//! address, so two identifiers are the same extension only if they are the same static. Values are
//! stored in an [`ExtensionSet`] owned by the extended message. A set learns about an extension the
//! first time one of its `&mut self` accessors is called with it, or up front through an
//! [`ExtensionRegistry`](registry/struct.ExtensionRegistry.html).
//!
//! ```
//! use protext::{raw, ExtendableMessage, Extension, ExtensionSet, FieldCodec, Mergable, Message, UnknownFieldSet};
//! use protext::collections::FieldSet;
//! use protext::io::{read, write, CodedReader, CodedWriter, FieldNumber, LengthBuilder, Tag, WireType};
//!
//! #[derive(Default, Clone, Debug, PartialEq, Hash)]
//! struct MyOptions {
//!     extensions: ExtensionSet<MyOptions>,
//!     unknown_fields: UnknownFieldSet,
//! }
//!
//! # impl Mergable for MyOptions {
//! #     fn merge(&mut self, other: &Self) {
//! #         self.extensions.merge(&other.extensions);
//! #         self.unknown_fields.merge(&other.unknown_fields);
//! #     }
//! # }
//! # impl Message for MyOptions {
//! #     fn merge_from(&mut self, input: &mut CodedReader) -> read::Result<()> {
//! #         while let Some(_) = input.read_tag()? {
//! #             input.try_add_field_to(&mut self.extensions)?
//! #                 .or_try(&mut self.unknown_fields)?
//! #                 .or_skip()?;
//! #         }
//! #         Ok(())
//! #     }
//! #     fn calculate_size(&self, builder: LengthBuilder) -> Option<LengthBuilder> {
//! #         builder.add_fields(&self.extensions)?.add_fields(&self.unknown_fields)
//! #     }
//! #     fn write_to(&self, output: &mut CodedWriter) -> write::Result {
//! #         output.write_fields(&self.extensions)?;
//! #         output.write_fields(&self.unknown_fields)
//! #     }
//! #     fn is_initialized(&self) -> bool {
//! #         FieldSet::is_initialized(&self.extensions)
//! #     }
//! #     fn unknown_fields(&self) -> &UnknownFieldSet { &self.unknown_fields }
//! #     fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet { &mut self.unknown_fields }
//! # }
//! impl ExtendableMessage for MyOptions {
//!     fn extensions(&self) -> &ExtensionSet<Self> { &self.extensions }
//!     fn extensions_mut(&mut self) -> &mut ExtensionSet<Self> { &mut self.extensions }
//! }
//!
//! const FIELD_10: FieldNumber = unsafe { FieldNumber::new_unchecked(10) };
//!
//! static BOOL_OPT: Extension<MyOptions, raw::Bool> =
//!     Extension::new(FieldCodec::new(Tag::new(FIELD_10, WireType::Varint), false));
//!
//! let mut options = MyOptions::new();
//! assert!(!options.extensions().has(&BOOL_OPT));
//! options.extensions_mut().set(&BOOL_OPT, true);
//! assert_eq!(*options.extensions().get(&BOOL_OPT), true);
//!
//! let data = options.write_to_vec().unwrap();
//! assert_eq!(data, [80, 1]);
//! ```

use std::any::{self, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use by_address::ByThinAddress;
use hashbrown::HashMap;
use log::{trace, warn};
use thiserror::Error;
use crate::{internal::Sealed, Mergable, Message};
use crate::codec::FieldCodec;
use crate::collections::{FieldSet, RepeatedField, TryRead};
use crate::io::{read, write, FieldNumber, LengthBuilder, CodedReader, CodedWriter};
use crate::raw::Value;

pub mod registry;
pub mod value;

use self::registry::ExtensionRegistry;
use self::value::{AnyExtension, ExtensionValue, RepeatedExtensionValue};

/// An object-safe identifier for an extension field.
///
/// This is implemented by [`Extension`] and [`RepeatedExtension`] and can't be implemented outside this crate.
pub trait ExtensionIdentifier: Sealed + Sync + 'static {
    /// Gets the field number of the extension
    fn field_number(&self) -> FieldNumber;
    /// Gets the type id of the message this extension extends
    fn target_type(&self) -> TypeId;
    /// Gets the name of the message type this extension extends
    fn target_type_name(&self) -> &'static str;
    /// Returns if the extension holds a repeated field
    fn is_repeated(&self) -> bool;

    #[doc(hidden)]
    fn new_value(&'static self) -> Box<dyn AnyExtension>;
}

/// An extension identifier known to extend the message type `T`.
pub trait ExtensionOf<T>: ExtensionIdentifier { }

pub(crate) fn same_identifier(a: &dyn ExtensionIdentifier, b: &dyn ExtensionIdentifier) -> bool {
    ByThinAddress(a) == ByThinAddress(b)
}

/// A message that can be extended with extension fields.
pub trait ExtendableMessage: Message {
    /// Gets a shared reference to the extension set in this message
    fn extensions(&self) -> &ExtensionSet<Self>;
    /// Gets a unique reference to the extension set in this message
    fn extensions_mut(&mut self) -> &mut ExtensionSet<Self>;

    /// Registers an identifier that is only known at runtime with this message's extensions.
    fn register_extension(&mut self, extension: &'static dyn ExtensionIdentifier) -> Result<(), ExtensionError> {
        self.extensions_mut().try_register(extension)
    }
}

/// The error returned when an extension can't be registered with a message's extensions
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtensionError {
    /// The extension extends a different message type
    #[error("extension for field {number} extends {found}, not {expected}")]
    TargetMismatch {
        /// The field number of the extension
        number: FieldNumber,
        /// The name of the message type the set belongs to
        expected: &'static str,
        /// The name of the message type the extension extends
        found: &'static str,
    },
    /// The field number is already registered to a different extension
    #[error("field number {0} is already registered to another extension")]
    NumberConflict(FieldNumber),
}

/// An extension identifier for accessing a singular extension value from an `ExtensionSet`
pub struct Extension<T, V: Value> {
    t: PhantomData<fn(T)>,
    codec: FieldCodec<V>,
}

impl<T, V: Value> Extension<T, V> {
    /// Creates a new extension identifier using the specified codec.
    /// The codec's default is returned for the extension when it isn't set.
    pub const fn new(codec: FieldCodec<V>) -> Self {
        Extension { t: PhantomData, codec }
    }

    /// Gets the codec used to read and write this extension
    #[inline]
    pub fn codec(&self) -> &FieldCodec<V> {
        &self.codec
    }

    /// Gets the default value of the extension
    #[inline]
    pub fn default(&self) -> &V::Inner {
        self.codec.default()
    }

    /// Gets the field number of the extension
    #[inline]
    pub fn field_number(&self) -> FieldNumber {
        self.codec.field_number()
    }
}

impl<T, V: Value> Debug for Extension<T, V> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Extension")
            .field("target", &any::type_name::<T>())
            .field("codec", &self.codec)
            .finish()
    }
}

impl<T, V: Value> Sealed for Extension<T, V> { }
impl<T: ExtendableMessage, V: Value> ExtensionIdentifier for Extension<T, V> {
    fn field_number(&self) -> FieldNumber {
        self.codec.field_number()
    }
    fn target_type(&self) -> TypeId {
        TypeId::of::<T>()
    }
    fn target_type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
    fn is_repeated(&self) -> bool {
        false
    }
    fn new_value(&'static self) -> Box<dyn AnyExtension> {
        Box::new(ExtensionValue::new(&self.codec))
    }
}
impl<T: ExtendableMessage, V: Value> ExtensionOf<T> for Extension<T, V> { }

/// An extension identifier for accessing a repeated extension value from an `ExtensionSet`.
///
/// Values are packed on the wire if the codec's tag is length delimited and the value kind can be packed.
pub struct RepeatedExtension<T, V: Value> {
    t: PhantomData<fn(T)>,
    codec: FieldCodec<V>,
}

impl<T, V: Value> RepeatedExtension<T, V> {
    /// Creates a new repeated extension identifier using the specified codec
    pub const fn new(codec: FieldCodec<V>) -> Self {
        RepeatedExtension { t: PhantomData, codec }
    }

    /// Gets the codec used to read and write values of this extension
    #[inline]
    pub fn codec(&self) -> &FieldCodec<V> {
        &self.codec
    }

    /// Gets the field number of the extension
    #[inline]
    pub fn field_number(&self) -> FieldNumber {
        self.codec.field_number()
    }
}

impl<T, V: Value> Debug for RepeatedExtension<T, V> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("RepeatedExtension")
            .field("target", &any::type_name::<T>())
            .field("codec", &self.codec)
            .finish()
    }
}

impl<T, V: Value> Sealed for RepeatedExtension<T, V> { }
impl<T: ExtendableMessage, V: Value> ExtensionIdentifier for RepeatedExtension<T, V> {
    fn field_number(&self) -> FieldNumber {
        self.codec.field_number()
    }
    fn target_type(&self) -> TypeId {
        TypeId::of::<T>()
    }
    fn target_type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
    fn is_repeated(&self) -> bool {
        true
    }
    fn new_value(&'static self) -> Box<dyn AnyExtension> {
        Box::new(RepeatedExtensionValue::new(&self.codec))
    }
}
impl<T: ExtendableMessage, V: Value> ExtensionOf<T> for RepeatedExtension<T, V> { }

struct Entry {
    id: &'static dyn ExtensionIdentifier,
    cell: Box<dyn AnyExtension>,
}

impl Clone for Entry {
    fn clone(&self) -> Self {
        Entry {
            id: self.id,
            cell: self.cell.clone_box(),
        }
    }
}

fn kind_mismatch(num: FieldNumber) -> ! {
    panic!("the value stored for extension field {} doesn't match its identifier", num)
}

/// A set of extension values that can be accessed by using extension identifiers.
///
/// Values are written in the order their extensions were registered with the set.
pub struct ExtensionSet<T> {
    t: PhantomData<fn(T)>,
    entries: Vec<Entry>,
    by_id: HashMap<ByThinAddress<&'static dyn ExtensionIdentifier>, usize>,
    by_num: HashMap<FieldNumber, usize>,
}

impl<T> Default for ExtensionSet<T> {
    fn default() -> Self {
        Self {
            t: PhantomData,
            entries: Vec::new(),
            by_id: HashMap::new(),
            by_num: HashMap::new(),
        }
    }
}

impl<T> Clone for ExtensionSet<T> {
    fn clone(&self) -> Self {
        Self {
            t: PhantomData,
            entries: self.entries.clone(),
            by_id: self.by_id.clone(),
            by_num: self.by_num.clone(),
        }
    }
}

impl<T: ExtendableMessage> ExtensionSet<T> {
    /// Returns a new empty set
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns a new set with every extension for `T` in the registry already registered
    pub fn with_registry(registry: &ExtensionRegistry) -> Self {
        let mut set = Self::new();
        for &id in registry.extensions_for::<T>() {
            set.insert(id);
        }
        set
    }

    fn insert(&mut self, id: &'static dyn ExtensionIdentifier) -> usize {
        let index = self.entries.len();
        let num = id.field_number();
        trace!("registering extension field {} with {}", num, any::type_name::<T>());

        self.entries.push(Entry { id, cell: id.new_value() });
        self.by_id.insert(ByThinAddress(id), index);
        self.by_num.insert(num, index);
        index
    }

    fn index_of(&mut self, id: &'static dyn ExtensionIdentifier) -> usize {
        if let Some(&index) = self.by_id.get(&ByThinAddress(id)) {
            return index;
        }
        let num = id.field_number();
        if self.by_num.contains_key(&num) {
            panic!("extension field {} of {} is already registered to another extension", num, any::type_name::<T>());
        }
        self.insert(id)
    }

    fn cell(&self, id: &'static dyn ExtensionIdentifier) -> Option<&dyn AnyExtension> {
        self.by_id.get(&ByThinAddress(id)).map(|&index| self.entries[index].cell.as_ref())
    }

    fn typed_cell<C: AnyExtension>(&self, id: &'static dyn ExtensionIdentifier) -> Option<&C> {
        self.cell(id).map(|cell| match cell.as_any().downcast_ref::<C>() {
            Some(cell) => cell,
            None => kind_mismatch(id.field_number()),
        })
    }

    fn typed_cell_mut<C: AnyExtension>(&mut self, id: &'static dyn ExtensionIdentifier) -> &mut C {
        let index = self.index_of(id);
        match self.entries[index].cell.as_any_mut().downcast_mut::<C>() {
            Some(cell) => cell,
            None => kind_mismatch(id.field_number()),
        }
    }

    fn present(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter().filter(|entry| entry.cell.has_value())
    }

    /// Registers an extension with the set. Registering the same extension again does nothing.
    ///
    /// # Panics
    ///
    /// Panics if the extension's field number is already registered to a different extension.
    pub fn register<E: ExtensionOf<T>>(&mut self, extension: &'static E) {
        self.index_of(extension);
    }

    /// Registers an extension that is only known at runtime with the set.
    /// Registering the same extension again does nothing.
    pub fn try_register(&mut self, extension: &'static dyn ExtensionIdentifier) -> Result<(), ExtensionError> {
        if extension.target_type() != TypeId::of::<T>() {
            let err = ExtensionError::TargetMismatch {
                number: extension.field_number(),
                expected: any::type_name::<T>(),
                found: extension.target_type_name(),
            };
            warn!("rejected extension: {}", err);
            return Err(err);
        }
        if self.by_id.contains_key(&ByThinAddress(extension)) {
            return Ok(());
        }
        let num = extension.field_number();
        if self.by_num.contains_key(&num) {
            let err = ExtensionError::NumberConflict(num);
            warn!("rejected extension for {}: {}", any::type_name::<T>(), err);
            return Err(err);
        }

        self.insert(extension);
        Ok(())
    }

    /// Returns if the extension is registered with this set
    pub fn is_registered<E: ExtensionOf<T>>(&self, extension: &'static E) -> bool {
        self.by_id.contains_key(&ByThinAddress(extension as &'static dyn ExtensionIdentifier))
    }

    /// Gets the value of the extension, or the extension's default value if it isn't set
    pub fn get<V: Value>(&self, extension: &'static Extension<T, V>) -> &V::Inner {
        self.typed_cell::<ExtensionValue<V>>(extension)
            .and_then(ExtensionValue::get)
            .unwrap_or_else(|| extension.default())
    }

    /// Gets a mutable reference to the value of the extension, registering the extension if needed.
    /// The value is marked as set, starting from the default value if it wasn't set before.
    pub fn get_mut<V: Value>(&mut self, extension: &'static Extension<T, V>) -> &mut V::Inner {
        self.typed_cell_mut::<ExtensionValue<V>>(extension).get_mut()
    }

    /// Sets the value of the extension, registering the extension if needed
    pub fn set<V: Value>(&mut self, extension: &'static Extension<T, V>, value: V::Inner) {
        self.typed_cell_mut::<ExtensionValue<V>>(extension).set(value)
    }

    /// Gets the values of the repeated extension, or an empty slice if it has no values
    pub fn get_repeated<V: Value>(&self, extension: &'static RepeatedExtension<T, V>) -> &[V::Inner] {
        match self.typed_cell::<RepeatedExtensionValue<V>>(extension) {
            Some(cell) => cell.values().as_slice(),
            None => &[],
        }
    }

    /// Gets the values of the repeated extension mutably, registering the extension if needed
    pub fn get_repeated_mut<V: Value>(&mut self, extension: &'static RepeatedExtension<T, V>) -> &mut RepeatedField<V::Inner> {
        self.typed_cell_mut::<RepeatedExtensionValue<V>>(extension).values_mut()
    }

    /// Returns if the extension has a value. A repeated extension has a value if it isn't empty.
    pub fn has<E: ExtensionOf<T>>(&self, extension: &'static E) -> bool {
        self.cell(extension).map_or(false, |cell| cell.has_value())
    }

    /// Clears the value of the extension. The extension stays registered.
    pub fn clear<E: ExtensionOf<T>>(&mut self, extension: &'static E) {
        if let Some(&index) = self.by_id.get(&ByThinAddress(extension as &'static dyn ExtensionIdentifier)) {
            self.entries[index].cell.clear();
        }
    }

    /// Gets the number of extensions registered with this set
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns if no extensions are registered with this set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets an iterator of the field numbers of all registered extensions in registration order
    pub fn field_numbers(&self) -> impl Iterator<Item = FieldNumber> + '_ {
        self.entries.iter().map(|entry| entry.id.field_number())
    }

    /// Merges the values in the source set into the destination set.
    /// Values of extensions not registered with the destination are cloned into it.
    ///
    /// # Panics
    ///
    /// Panics if an extension in the source uses a field number registered to a different
    /// extension in the destination.
    pub fn merge_into(source: &Self, destination: &mut Self) {
        for entry in &source.entries {
            match destination.by_id.get(&ByThinAddress(entry.id)) {
                Some(&index) => AnyExtension::merge(destination.entries[index].cell.as_mut(), entry.cell.as_ref()),
                None => {
                    let index = destination.index_of(entry.id);
                    destination.entries[index].cell = entry.cell.clone_box();
                }
            }
        }
    }
}

impl<T: ExtendableMessage> Mergable for ExtensionSet<T> {
    fn merge(&mut self, other: &Self) {
        Self::merge_into(other, self)
    }
}

impl<T: ExtendableMessage> PartialEq for ExtensionSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.present().count() == other.present().count() &&
            self.present().all(|entry|
                match other.cell(entry.id) {
                    Some(cell) => cell.has_value() && AnyExtension::eq(entry.cell.as_ref(), cell),
                    None => false,
                })
    }
}

impl<T: ExtendableMessage> Eq for ExtensionSet<T> { }

impl<T: ExtendableMessage> Hash for ExtensionSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        TypeId::of::<T>().hash(state);
        // cells are folded together so registration order doesn't change the hash
        let folded = self.present().fold(0u64, |acc, entry| {
            let mut hasher = DefaultHasher::new();
            ByThinAddress(entry.id).hash(&mut hasher);
            entry.cell.hash_value(&mut hasher);
            acc ^ hasher.finish()
        });
        folded.hash(state);
    }
}

impl<T> Debug for ExtensionSet<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .filter(|entry| entry.cell.has_value())
                    .map(|entry| (entry.id.field_number(), &entry.cell)))
            .finish()
    }
}

impl<T> Sealed for ExtensionSet<T> { }
impl<T: ExtendableMessage> FieldSet for ExtensionSet<T> {
    fn try_add_field_from<'a, 'b>(&mut self, input: &'a mut CodedReader<'b>) -> read::Result<TryRead<'a, 'b>> {
        let tag = match input.last_tag() {
            Some(tag) => tag,
            None => return Ok(TryRead::Consumed),
        };
        match self.by_num.get(&tag.field()) {
            Some(&index) => {
                if self.entries[index].cell.merge_from_wire(input)? {
                    trace!("read extension field {} of {}", tag.field(), any::type_name::<T>());
                    Ok(TryRead::Consumed)
                } else {
                    Ok(TryRead::Yielded(input))
                }
            },
            None => Ok(TryRead::Yielded(input)),
        }
    }
    fn calculate_size(&self, builder: LengthBuilder) -> Option<LengthBuilder> {
        self.entries
            .iter()
            .try_fold(builder, |builder, entry| entry.cell.calculate_size(builder))
    }
    fn write_to(&self, output: &mut CodedWriter) -> write::Result {
        for entry in &self.entries {
            entry.cell.write_to(output)?;
        }
        Ok(())
    }
    fn is_initialized(&self) -> bool {
        self.entries.iter().all(|entry| entry.cell.is_initialized())
    }
}
