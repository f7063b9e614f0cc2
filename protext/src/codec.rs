//! Defines the `FieldCodec`, the pairing of a field's tag with a value kind and default value.

use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use crate::io::{read, write, FieldNumber, Tag, WireType, LengthBuilder, CodedReader, CodedWriter};
use crate::raw::Value;

/// Reads, writes, merges, and sizes values of a single field.
///
/// A codec is immutable and meant to live in a static, shared by every value of the field.
pub struct FieldCodec<V: Value> {
    tag: Tag,
    end_tag: Option<Tag>,
    default: V::Inner,
    v: PhantomData<fn() -> V>,
}

impl<V: Value> FieldCodec<V> {
    /// Creates a new codec for a field with the specified tag and default value.
    /// If the tag starts a group, the matching end tag is derived from it.
    pub const fn new(tag: Tag, default: V::Inner) -> Self {
        let end_tag =
            if tag.get() & 0b111 == WireType::StartGroup as u32 {
                Some(tag.end_group())
            } else {
                None
            };
        FieldCodec { tag, end_tag, default, v: PhantomData }
    }

    /// Gets the tag written before every value
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Gets the tag written after every value if this is a group codec
    #[inline]
    pub fn end_tag(&self) -> Option<Tag> {
        self.end_tag
    }

    /// Gets the field number of the codec's tag
    #[inline]
    pub fn field_number(&self) -> FieldNumber {
        self.tag.field()
    }

    /// Gets the default value of the field
    #[inline]
    pub fn default(&self) -> &V::Inner {
        &self.default
    }

    /// Returns if repeated values written with this codec are packed.
    /// This is true when the value's wire type can be packed and the tag is length delimited.
    #[inline]
    pub fn is_packed(&self) -> bool {
        V::WIRE_TYPE.is_packable() && self.tag.wire_type() == WireType::LengthDelimited
    }

    /// Returns if a field with the specified wire type can be read by this codec
    #[inline]
    pub fn accepts(&self, wire_type: WireType) -> bool {
        wire_type == V::WIRE_TYPE ||
            (wire_type == WireType::LengthDelimited && V::WIRE_TYPE.is_packable())
    }

    /// Returns if the value is equal to the field's default value
    #[inline]
    pub fn is_default(&self, value: &V::Inner) -> bool {
        V::value_eq(value, &self.default)
    }

    /// Reads a new value from the input
    #[inline]
    pub fn read(&self, input: &mut CodedReader) -> read::Result<V::Inner> {
        V::read_new(input)
    }

    /// Merges a value from the input into an existing value
    #[inline]
    pub fn merge_from(&self, input: &mut CodedReader, value: &mut V::Inner) -> read::Result<()> {
        V::merge_from(input, value)
    }

    /// Merges another value into an existing value. Messages are merged field by field, other values are replaced.
    #[inline]
    pub fn merge(&self, value: &mut V::Inner, other: &V::Inner) {
        V::merge(value, other)
    }

    /// Writes the value without a tag
    #[inline]
    pub fn write(&self, output: &mut CodedWriter, value: &V::Inner) -> write::Result {
        output.write_value::<V>(value)
    }

    /// Adds the size of the value without a tag to the builder
    #[inline]
    pub fn calculate_size(&self, builder: LengthBuilder, value: &V::Inner) -> Option<LengthBuilder> {
        builder.add_value::<V>(value)
    }

    /// Writes the tag and value to the output if the value isn't the default value
    #[inline]
    pub fn write_tag_and_value(&self, output: &mut CodedWriter, value: &V::Inner) -> write::Result {
        if self.is_default(value) {
            Ok(())
        } else {
            self.force_write_tag_and_value(output, value)
        }
    }

    /// Writes the tag and value to the output
    pub fn force_write_tag_and_value(&self, output: &mut CodedWriter, value: &V::Inner) -> write::Result {
        output.write_tag(self.tag)?;
        output.write_value::<V>(value)?;
        if let Some(end) = self.end_tag {
            output.write_tag(end)?;
        }
        Ok(())
    }

    /// Adds the size of the tag and value to the builder if the value isn't the default value
    #[inline]
    pub fn calculate_size_with_tag(&self, builder: LengthBuilder, value: &V::Inner) -> Option<LengthBuilder> {
        if self.is_default(value) {
            Some(builder)
        } else {
            self.force_calculate_size_with_tag(builder, value)
        }
    }

    /// Adds the size of the tag and value to the builder
    pub fn force_calculate_size_with_tag(&self, builder: LengthBuilder, value: &V::Inner) -> Option<LengthBuilder> {
        let builder = builder.add_tag(self.tag)?.add_value::<V>(value)?;
        match self.end_tag {
            Some(end) => builder.add_tag(end),
            None => Some(builder),
        }
    }
}

impl<V: Value> Debug for FieldCodec<V> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("FieldCodec")
            .field("tag", &self.tag)
            .field("default", &self.default)
            .finish()
    }
}
