//! Runtime support for extendable protobuf messages.
//!
//! Along with the coded readers and writers needed to move values on and off the wire, this crate
//! provides the extension runtime: typed extension identifiers declared as statics, the type-erased
//! [`ExtensionSet`](extend/struct.ExtensionSet.html) stored in every extendable message, and
//! [`ExtensionRegistry`](extend/registry/struct.ExtensionRegistry.html) for pre-populating sets
//! with known extensions.

#![warn(missing_docs)]

mod internal {
    pub trait Sealed { }
}

pub mod codec;
pub mod collections;
pub mod extend;
pub mod io;
pub mod raw;

use crate::io::{read, write, Length, LengthBuilder, CodedReader, CodedWriter};
use std::fmt::Debug;
use std::hash::Hash;

pub use codec::FieldCodec;
pub use collections::unknown_fields::UnknownFieldSet;
pub use extend::{ExtendableMessage, Extension, RepeatedExtension, ExtensionSet, registry::ExtensionRegistry};

/// A type that can merge another instance of itself into itself.
pub trait Mergable {
    /// Merges another instance of this type into this one
    fn merge(&mut self, other: &Self);
}

/// A protobuf message.
pub trait Message: Mergable + Clone + Default + Debug + PartialEq + Hash + Send + Sync + 'static {
    /// Merges this message with data from the specified [`CodedReader`](io/struct.CodedReader.html)
    fn merge_from(&mut self, input: &mut CodedReader) -> read::Result<()>;
    /// Adds the size of the data in the message to the [`LengthBuilder`](io/struct.LengthBuilder.html)
    fn calculate_size(&self, builder: LengthBuilder) -> Option<LengthBuilder>;
    /// Writes this message's data to the specified [`CodedWriter`](io/struct.CodedWriter.html)
    fn write_to(&self, output: &mut CodedWriter) -> write::Result;
    /// Returns if the message value is initialized
    fn is_initialized(&self) -> bool;

    /// Gets a shared reference to the unknown fields in this message
    fn unknown_fields(&self) -> &UnknownFieldSet;
    /// Gets a unique reference to the unknown fields in this message
    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet;

    /// Creates a new instance of the message
    fn new() -> Self {
        Self::default()
    }
    /// Reads a new instance of the message from a [`CodedReader`](io/struct.CodedReader.html)
    fn new_from(input: &mut CodedReader) -> read::Result<Self> {
        let mut instance = Self::new();
        instance.merge_from(input)?;
        Ok(instance)
    }
    /// Calculates the size of the message, returning `None` if the message is too large
    fn compute_size(&self) -> Option<Length> {
        self.calculate_size(LengthBuilder::new()).map(LengthBuilder::build)
    }
    /// Writes the message to a new vector of bytes
    fn write_to_vec(&self) -> Result<Vec<u8>, write::Error> {
        let len = self.compute_size().ok_or(write::Error::ValueTooLarge)?;
        let mut output = vec![0u8; len.get() as usize];
        self.write_to(&mut CodedWriter::with_slice(&mut output))?;
        Ok(output)
    }
}

/// A marker trait used to mark enum types in generated code.
/// This defines all the main traits the enum types implement,
/// allowing code to refer to them easily.
///
/// The `From<i32>` conversion must be total, keeping values the enum doesn't name.
pub trait Enum: From<i32> + Into<i32> + Copy + Debug + PartialEq + Hash + Send + Sync + 'static { }
