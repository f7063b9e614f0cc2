//! Contains types and traits for reading and writing protobuf coded data.

pub mod read;
pub mod write;

pub use read::{Builder as ReaderBuilder, CodedReader, ReaderOptions};
pub use write::CodedWriter;

use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};
use std::num::NonZeroU32;
use crate::collections::{RepeatedValue, FieldSet};
use crate::raw::Value;
use thiserror::Error;

/// The wire type of a protobuf value.
///
/// A wire type is paired with a field number between 1 and 536,870,911 to create a tag,
/// a unique identifier for a field on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum WireType {
    /// A value read as a variable length integer.
    ///
    /// See the protobuf docs for more information on this encoding: https://developers.google.com/protocol-buffers/docs/encoding#varints
    Varint = 0,
    /// A 64-bit value encoded as 8 little endian bytes
    Bit64 = 1,
    /// A length delimited value. The length is encoded as a varint
    LengthDelimited = 2,
    /// A start group tag, deprecated in proto3.
    StartGroup = 3,
    /// An end group tag, deprecated in proto3.
    EndGroup = 4,
    /// A 32-bit value encoded as 4 little endian bytes
    Bit32 = 5,
}

impl WireType {
    /// Gets whether a wire type is eligible for repeated field packing.
    /// The valid packable wire types are Bit32, Bit64, and Varint.
    pub const fn is_packable(self) -> bool {
        (self as u8 == WireType::Varint as u8) ||
        (self as u8 == WireType::Bit64 as u8) ||
        (self as u8 == WireType::Bit32 as u8)
    }
}

/// A protobuf field number. Its value is known to be less than or equal to 536870911 and not 0.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldNumber(NonZeroU32);

impl FieldNumber {
    /// The max value of a field number as a u32
    pub const MAX_VALUE: u32 = 536_870_911;

    /// Create a field number without checking the value.
    ///
    /// # Safety
    ///
    /// The value must be a valid field number
    #[inline]
    pub const unsafe fn new_unchecked(n: u32) -> FieldNumber {
        FieldNumber(NonZeroU32::new_unchecked(n))
    }

    /// Creates a field number if the given value is not zero or more than 536870911
    ///
    /// # Examples
    ///
    /// ```
    /// use protext::io::FieldNumber;
    ///
    /// assert_eq!(FieldNumber::new(0), None);
    /// assert_eq!(FieldNumber::new(1).map(FieldNumber::get), Some(1));
    /// assert_eq!(FieldNumber::new(FieldNumber::MAX_VALUE).map(FieldNumber::get), Some(536_870_911));
    /// assert_eq!(FieldNumber::new(FieldNumber::MAX_VALUE + 1), None);
    /// ```
    #[inline]
    pub const fn new(n: u32) -> Option<FieldNumber> {
        if n != 0 && n <= Self::MAX_VALUE {
            unsafe { Some(FieldNumber(NonZeroU32::new_unchecked(n))) }
        } else {
            None
        }
    }

    /// Returns the value as a [`u32`](https://doc.rust-lang.org/std/primitive.u32.html)
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Display for FieldNumber {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A tag containing a wire type and field number. Its value is known to not be 0, and both field number and wire type are valid values
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(NonZeroU32);

impl Tag {
    /// Creates a new tag value
    #[inline]
    pub const fn new(f: FieldNumber, wt: WireType) -> Tag {
        unsafe { Tag(NonZeroU32::new_unchecked((f.get() << 3) | wt as u32)) }
    }

    /// Gets the wire type from this tag
    ///
    /// # Examples
    ///
    /// ```
    /// use protext::io::{Tag, WireType};
    /// # use std::convert::TryFrom;
    ///
    /// assert_eq!(Tag::try_from(8).unwrap().wire_type(), WireType::Varint);
    /// assert_eq!(Tag::try_from(17).unwrap().wire_type(), WireType::Bit64);
    /// ```
    #[inline]
    pub fn wire_type(self) -> WireType {
        match self.get() & 0b111 {
            0 => WireType::Varint,
            1 => WireType::Bit64,
            2 => WireType::LengthDelimited,
            3 => WireType::StartGroup,
            4 => WireType::EndGroup,
            // tags are checked on construction, 6 and 7 never get here
            _ => WireType::Bit32,
        }
    }

    /// Gets the field number from this tag
    ///
    /// # Examples
    ///
    /// ```
    /// use protext::io::Tag;
    /// # use std::convert::TryFrom;
    ///
    /// assert_eq!(Tag::try_from(8).unwrap().field().get(), 1);
    /// assert_eq!(Tag::try_from(17).unwrap().field().get(), 2);
    /// ```
    #[inline]
    pub const fn field(self) -> FieldNumber {
        unsafe { FieldNumber::new_unchecked(self.get() >> 3) }
    }

    /// Returns the end group tag paired with this tag's field number
    #[inline]
    pub const fn end_group(self) -> Tag {
        Tag::new(self.field(), WireType::EndGroup)
    }

    /// Returns the value as a [`u32`](https://doc.rust-lang.org/std/primitive.u32.html)
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The error returned when an attempt to convert a 32-bit value to a tag fails due to an invalid field number or wire type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid tag; this could be caused by an invalid wire type or a 0 field number")]
pub struct TryTagFromRawError(());

impl TryFrom<u32> for Tag {
    type Error = TryTagFromRawError;

    /// Creates a new tag if the value is not zero and has a valid field number and wire type
    ///
    /// # Examples
    ///
    /// ```
    /// use protext::io::Tag;
    /// # use std::convert::TryFrom;
    ///
    /// assert!(Tag::try_from(1).is_err());
    /// assert!(Tag::try_from(8).is_ok());
    /// assert!(Tag::try_from(16).is_ok());
    /// assert!(Tag::try_from(14).is_err());
    /// ```
    #[inline]
    fn try_from(n: u32) -> Result<Tag, TryTagFromRawError> {
        match (n & 0b111, n >> 3) {
            // (wire type, field number)
            (6, _) | (7, _) | (_, 0) => Err(TryTagFromRawError(())),
            _ => unsafe { Ok(Tag(NonZeroU32::new_unchecked(n))) },
        }
    }
}

/// An opaque type that represents the length of a delimited value
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Length(i32);

impl Length {
    /// Returns the value as a [`i32`](https://doc.rust-lang.org/std/primitive.i32.html)
    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Makes a new length from the specified [`i32`], returning [`None`] if the value is negative
    pub const fn new(x: i32) -> Option<Length> {
        if x < 0 {
            None
        } else {
            Some(Length(x))
        }
    }

    /// Makes a new length from the specified [`i32`], without checking if the value is negative.
    ///
    /// # Safety
    ///
    /// The value must not be negative
    #[inline]
    pub const unsafe fn new_unchecked(x: i32) -> Length {
        Length(x)
    }

    /// Makes a length out of the length of a slice, returning [`None`] if it doesn't fit in an [`i32`]
    #[inline]
    pub fn of_slice(value: &[u8]) -> Option<Length> {
        i32::try_from(value.len()).ok().map(Length)
    }

    /// Returns the length of the value in the specified form
    pub fn of_value<V: Value>(value: &V::Inner) -> Option<Length> {
        LengthBuilder::new().add_value::<V>(value).map(LengthBuilder::build)
    }

    /// Returns the length of the set of values with the specified tag
    pub fn of_values<V: Value, T: RepeatedValue<V>>(value: &T, tag: Tag) -> Option<Length> {
        value.calculate_size(LengthBuilder::new(), tag).map(LengthBuilder::build)
    }
}

/// An opaque type for building a length for writing to an output.
///
/// This exists to make creating checked lengths easier in generated code.
#[derive(Debug, Clone, Copy)]
pub struct LengthBuilder(i32);

impl LengthBuilder {
    /// Creates a new length builder
    #[inline]
    pub const fn new() -> LengthBuilder {
        Self(0)
    }

    /// Adds an arbitrary number of bytes to the length
    #[inline]
    #[must_use = "this returns the builder to chain and does not mutate it in place"]
    pub fn add_bytes(self, value: Length) -> Option<Self> {
        #[cfg(feature = "checked_size")]
        return self.0.checked_add(value.get()).map(LengthBuilder);

        #[cfg(not(feature = "checked_size"))]
        return Some(LengthBuilder(self.0 + value.get()));
    }

    /// Adds a tag's size to the length
    #[inline]
    #[must_use = "this returns the builder to chain and does not mutate it in place"]
    pub fn add_tag(self, tag: Tag) -> Option<Self> {
        self.add_bytes(raw_varint32_size(tag.get()))
    }

    /// Adds a length prefix and the bytes it covers
    #[inline]
    #[must_use = "this returns the builder to chain and does not mutate it in place"]
    pub fn add_length_delimited(self, length: Length) -> Option<Self> {
        self.add_bytes(raw_varint32_size(length.get() as u32))?
            .add_bytes(length)
    }

    /// Adds a value's length to this instance
    #[inline]
    #[must_use = "this returns the builder to chain and does not mutate it in place"]
    pub fn add_value<V: Value>(self, value: &V::Inner) -> Option<Self> {
        V::calculate_size(value, self)
    }

    /// Adds a field's length to this instance using the specified field number
    #[inline]
    #[must_use = "this returns the builder to chain and does not mutate it in place"]
    pub fn add_field<V: Value>(self, num: FieldNumber, value: &V::Inner) -> Option<Self> {
        let tag = Tag::new(num, V::WIRE_TYPE);
        let builder = self.add_tag(tag)?.add_value::<V>(value)?;
        if V::WIRE_TYPE == WireType::StartGroup {
            builder.add_tag(tag.end_group())
        } else {
            Some(builder)
        }
    }

    /// Adds the length of the fields in the set to this instance
    #[inline]
    #[must_use = "this returns the builder to chain and does not mutate it in place"]
    pub fn add_fields<T: FieldSet>(self, value: &T) -> Option<Self> {
        value.calculate_size(self)
    }

    /// Consumes the builder, returning a [`Length`](struct.Length.html) for writing to an output
    #[inline]
    pub const fn build(self) -> Length {
        Length(self.0)
    }
}

impl Default for LengthBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
pub(crate) const fn raw_varint32_size(value: u32) -> Length {
    Length((((31 ^ (value | 1).leading_zeros()) * 9 + 73) / 64) as i32)
}

#[inline]
pub(crate) const fn raw_varint64_size(value: u64) -> Length {
    Length((((63 ^ (value | 1).leading_zeros()) * 9 + 73) / 64) as i32)
}

#[cfg(test)]
mod test {
    use std::convert::TryFrom;
    use crate::io::{raw_varint32_size, raw_varint64_size, FieldNumber, LengthBuilder, Length, Tag, WireType};

    #[test]
    fn varint_sizes() {
        assert_eq!(raw_varint32_size(0).get(), 1);
        assert_eq!(raw_varint32_size(127).get(), 1);
        assert_eq!(raw_varint32_size(128).get(), 2);
        assert_eq!(raw_varint32_size(16_383).get(), 2);
        assert_eq!(raw_varint32_size(16_384).get(), 3);
        assert_eq!(raw_varint32_size(u32::max_value()).get(), 5);

        assert_eq!(raw_varint64_size(0).get(), 1);
        assert_eq!(raw_varint64_size(u32::max_value() as u64).get(), 5);
        assert_eq!(raw_varint64_size(u64::max_value()).get(), 10);
    }
    #[test]
    fn tag_parts() {
        let num = FieldNumber::new(100).unwrap();
        let tag = Tag::new(num, WireType::StartGroup);

        assert_eq!(tag.field(), num);
        assert_eq!(tag.wire_type(), WireType::StartGroup);
        assert_eq!(tag.end_group(), Tag::new(num, WireType::EndGroup));
        assert_eq!(Tag::try_from(tag.get()), Ok(tag));
    }
    #[test]
    fn packable_wire_types() {
        assert!(WireType::Varint.is_packable());
        assert!(WireType::Bit32.is_packable());
        assert!(WireType::Bit64.is_packable());
        assert!(!WireType::LengthDelimited.is_packable());
        assert!(!WireType::StartGroup.is_packable());
        assert!(!WireType::EndGroup.is_packable());
    }
    #[test]
    fn length_delimited_size() {
        let length = Length::new(200).unwrap();
        let builder = LengthBuilder::new().add_length_delimited(length).unwrap();

        assert_eq!(builder.build().get(), 202);
        assert_eq!(Length::new(-1), None);
    }
}
