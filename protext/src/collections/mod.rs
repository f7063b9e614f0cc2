//! Defines collection types used by generated code for repeated fields and sets of fields

use std::convert::TryFrom;
use std::fmt::{self, Debug, Formatter};
use crate::{Mergable, internal::Sealed};
use crate::io::{self, read, write, WireType, Tag, LengthBuilder, Length, CodedReader, CodedWriter};
use crate::raw::Value;

pub mod unknown_fields;

/// A type of value that writes and reads repeated values on the wire.
pub trait RepeatedValue<V>: Sealed {
    /// Adds entries to the repeated field from the coded reader. The last tag read
    /// decides if the entries are packed.
    fn add_entries_from(&mut self, input: &mut CodedReader) -> read::Result<()>;
    /// Calculates the size of the repeated value written with the specified tag.
    fn calculate_size(&self, builder: LengthBuilder, tag: Tag) -> Option<LengthBuilder>;
    /// Writes the value to the coded writer. Values are packed if the value can be packed and the tag is length delimited.
    fn write_to(&self, output: &mut CodedWriter, tag: Tag) -> write::Result;
    /// Returns a bool indicating whether all the values in the field are initialized
    fn is_initialized(&self) -> bool;
}

/// A set of fields. This unifies unknown fields, extension fields, and any other future field set types
pub trait FieldSet: Sealed {
    /// Checks if the set can read the field from the input and reads it if it can. It returns a state indicating if the field was read.
    fn try_add_field_from<'a, 'b>(&mut self, input: &'a mut CodedReader<'b>) -> read::Result<TryRead<'a, 'b>>;
    /// Calculates the size of all the fields in this set
    fn calculate_size(&self, builder: LengthBuilder) -> Option<LengthBuilder>;
    /// Writes the fields in this set to the writer
    fn write_to(&self, output: &mut CodedWriter) -> write::Result;
    /// Returns if all the fields in this set are initialized
    fn is_initialized(&self) -> bool;
}

/// The result of trying to add a field to a field set
#[must_use = "a yielded field must be read by another set or skipped"]
pub enum TryRead<'a, 'b> {
    /// The set didn't read the field. Sets should return the
    /// borrowed reader to allow other sets to possibly read the field
    Yielded(&'a mut CodedReader<'b>),
    /// The set read the field, consuming it
    Consumed,
}

impl<'a, 'b> TryRead<'a, 'b> {
    /// Tries to read the field into the specified set. If the field has already been read, this does nothing.
    #[inline]
    pub fn or_try<S: FieldSet>(self, set: &mut S) -> read::Result<TryRead<'a, 'b>> {
        match self {
            TryRead::Yielded(input) => set.try_add_field_from(input),
            TryRead::Consumed => Ok(TryRead::Consumed),
        }
    }
    /// Skips the field if it hasn't already been read
    #[inline]
    pub fn or_skip(self) -> read::Result<()> {
        match self {
            TryRead::Yielded(input) => input.skip(),
            TryRead::Consumed => Ok(()),
        }
    }
    /// Returns if the field was read by a set
    #[inline]
    pub fn is_consumed(&self) -> bool {
        match self {
            TryRead::Yielded(_) => false,
            TryRead::Consumed => true,
        }
    }
}

impl Debug for TryRead<'_, '_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TryRead::Yielded(_) => f.write_str("Yielded"),
            TryRead::Consumed => f.write_str("Consumed"),
        }
    }
}

/// The type used by generated code to represent a repeated field.
pub type RepeatedField<T> = Vec<T>;

fn is_packed<V: Value>(tag: Tag) -> bool {
    V::WIRE_TYPE.is_packable() && tag.wire_type() == WireType::LengthDelimited
}

fn values_size<V: Value>(values: &[V::Inner], builder: LengthBuilder) -> Option<LengthBuilder> {
    match V::FIXED_SIZE {
        Some(size) => {
            let len = i32::try_from(values.len()).ok()?;
            let total =
                if cfg!(feature = "checked_size") {
                    len.checked_mul(size)?
                } else {
                    len * size
                };
            builder.add_bytes(Length::new(total)?)
        },
        None => values.iter().try_fold(builder, |builder, value| builder.add_value::<V>(value)),
    }
}

impl<T> Sealed for RepeatedField<T> { }
impl<V: Value> RepeatedValue<V> for RepeatedField<V::Inner> {
    fn add_entries_from(&mut self, input: &mut CodedReader) -> read::Result<()> {
        let packed = match input.last_tag() {
            Some(tag) => is_packed::<V>(tag),
            None => false,
        };
        if packed {
            let old = input.read_and_push_length()?;
            while !input.reached_limit() {
                self.push(V::read_new(input)?);
            }
            input.pop_length(old);
        } else {
            self.push(V::read_new(input)?);
        }
        Ok(())
    }
    fn calculate_size(&self, builder: LengthBuilder, tag: Tag) -> Option<LengthBuilder> {
        if self.is_empty() {
            return Some(builder);
        }

        if is_packed::<V>(tag) {
            let len = values_size::<V>(self, LengthBuilder::new())?.build();
            builder.add_tag(tag)?.add_length_delimited(len)
        } else {
            let len = i32::try_from(self.len()).ok()?;
            let tag_len = io::raw_varint32_size(tag.get()).get();
            // groups write an end tag of the same size after every value
            let tags_per_value = if V::WIRE_TYPE == WireType::StartGroup { 2 } else { 1 };
            let tags_len =
                if cfg!(feature = "checked_size") {
                    tag_len.checked_mul(tags_per_value)?.checked_mul(len)?
                } else {
                    tag_len * tags_per_value * len
                };
            values_size::<V>(self, builder.add_bytes(Length::new(tags_len)?)?)
        }
    }
    fn write_to(&self, output: &mut CodedWriter, tag: Tag) -> write::Result {
        if self.is_empty() {
            return Ok(());
        }

        if is_packed::<V>(tag) {
            let len =
                values_size::<V>(self, LengthBuilder::new())
                    .ok_or(write::Error::ValueTooLarge)?
                    .build();
            output.write_tag(tag)?;
            output.write_length(len)?;
            for value in self {
                output.write_value::<V>(value)?;
            }
        } else {
            let end = if V::WIRE_TYPE == WireType::StartGroup { Some(tag.end_group()) } else { None };
            for value in self {
                output.write_tag(tag)?;
                output.write_value::<V>(value)?;
                if let Some(end) = end {
                    output.write_tag(end)?;
                }
            }
        }
        Ok(())
    }
    fn is_initialized(&self) -> bool {
        self.iter().all(V::is_initialized)
    }
}

impl<T: Clone> Mergable for RepeatedField<T> {
    /// Merges two repeated fields by extending this field with the elements of the other
    fn merge(&mut self, other: &Self) {
        self.extend(other.iter().cloned())
    }
}
