//! Contains types for protobuf values and traits for value operations.
//!
//! Each type here is a zero-sized marker naming one protobuf value kind. The marker's
//! [`Value`](trait.Value.html) implementation reads, writes, sizes, merges, compares, and hashes
//! values of its [`Inner`](trait.Value.html#associatedtype.Inner) type the way that kind is encoded on the wire.

use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use crate::internal::Sealed;
use crate::io::{read, write, raw_varint32_size, raw_varint64_size, FieldNumber, Length, LengthBuilder, CodedReader, CodedWriter, Tag, WireType};

/// A protobuf value kind capable of reading a value from an input, writing it to an output,
/// calculating its size, merging it, and checking its initialization.
pub trait Value: Sealed + 'static {
    /// The Rust type used to store values of this kind
    type Inner: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// A value indicating the wire type of the value without packing.
    /// This can be used to indicate if a value is elegible for repeated field packing.
    const WIRE_TYPE: WireType;

    /// The encoded size of every value of this kind if it never changes
    const FIXED_SIZE: Option<i32> = None;

    /// Adds the size of the value as encoded on the wire to the builder
    fn calculate_size(value: &Self::Inner, builder: LengthBuilder) -> Option<LengthBuilder>;

    /// Reads a new instance of the value from the [`CodedReader`](../io/struct.CodedReader.html)
    fn read_new(input: &mut CodedReader) -> read::Result<Self::Inner>;

    /// Merges the value with a value from the [`CodedReader`](../io/struct.CodedReader.html).
    /// For most values this replaces the existing value.
    fn merge_from(input: &mut CodedReader, value: &mut Self::Inner) -> read::Result<()> {
        *value = Self::read_new(input)?;
        Ok(())
    }

    /// Merges another value into this one. For most values this replaces the existing value.
    fn merge(value: &mut Self::Inner, other: &Self::Inner) {
        value.clone_from(other);
    }

    /// Writes the value to the [`CodedWriter`](../io/struct.CodedWriter.html)
    fn write_to(value: &Self::Inner, output: &mut CodedWriter) -> write::Result;

    /// Returns if the value is initialized, that is, if all the required fields in the value are set.
    fn is_initialized(_value: &Self::Inner) -> bool {
        true
    }

    /// Returns if two values are the same
    fn value_eq(a: &Self::Inner, b: &Self::Inner) -> bool {
        a == b
    }

    /// Feeds the value into the hasher
    fn hash_value<H: Hasher>(value: &Self::Inner, state: &mut H);
}

macro_rules! varint_value {
    ($(#[$m:meta])* $name:ident($inner:ty) => |$v:ident| $size:expr, |$i:ident| $read:expr, |$w:ident, $o:ident| $write:expr) => {
        $(#[$m])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl Sealed for $name { }
        impl Value for $name {
            type Inner = $inner;

            const WIRE_TYPE: WireType = WireType::Varint;

            #[inline]
            fn calculate_size($v: &$inner, builder: LengthBuilder) -> Option<LengthBuilder> {
                builder.add_bytes($size)
            }
            #[inline]
            fn read_new($i: &mut CodedReader) -> read::Result<$inner> {
                $read
            }
            #[inline]
            fn write_to($w: &$inner, $o: &mut CodedWriter) -> write::Result {
                $write
            }
            #[inline]
            fn hash_value<H: Hasher>(value: &$inner, state: &mut H) {
                value.hash(state)
            }
        }
    };
}

macro_rules! fixed_value {
    ($(#[$m:meta])* $name:ident($inner:ident), $wt:ident, $size:literal, |$i:ident| $read:expr, |$w:ident, $o:ident| $write:expr) => {
        $(#[$m])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl Sealed for $name { }
        impl Value for $name {
            type Inner = $inner;

            const WIRE_TYPE: WireType = WireType::$wt;
            const FIXED_SIZE: Option<i32> = Some($size);

            #[inline]
            fn calculate_size(_: &$inner, builder: LengthBuilder) -> Option<LengthBuilder> {
                builder.add_bytes(unsafe { Length::new_unchecked($size) })
            }
            #[inline]
            fn read_new($i: &mut CodedReader) -> read::Result<$inner> {
                $read
            }
            #[inline]
            fn write_to($w: &$inner, $o: &mut CodedWriter) -> write::Result {
                $write
            }
            fixed_value!(@compare $inner);
        }
    };
    (@compare f32) => {
        #[inline]
        fn value_eq(a: &f32, b: &f32) -> bool {
            a.to_bits() == b.to_bits()
        }
        #[inline]
        fn hash_value<H: Hasher>(value: &f32, state: &mut H) {
            value.to_bits().hash(state)
        }
    };
    (@compare f64) => {
        #[inline]
        fn value_eq(a: &f64, b: &f64) -> bool {
            a.to_bits() == b.to_bits()
        }
        #[inline]
        fn hash_value<H: Hasher>(value: &f64, state: &mut H) {
            value.to_bits().hash(state)
        }
    };
    (@compare $inner:ident) => {
        #[inline]
        fn hash_value<H: Hasher>(value: &$inner, state: &mut H) {
            value.hash(state)
        }
    };
}

varint_value! {
    /// A varint encoded 32-bit value. Negative values are encoded as 10-byte varints.
    Int32(i32) =>
        |v| raw_varint64_size(*v as i64 as u64),
        |input| input.read_varint32().map(|v| v as i32),
        |v, output| output.write_varint64(*v as i64 as u64)
}

varint_value! {
    /// A varint encoded 32-bit value. Can be at most 5 bytes.
    Uint32(u32) =>
        |v| raw_varint32_size(*v),
        |input| input.read_varint32(),
        |v, output| output.write_varint32(*v)
}

varint_value! {
    /// A varint encoded 64-bit value. Can be at most 10 bytes.
    Int64(i64) =>
        |v| raw_varint64_size(*v as u64),
        |input| input.read_varint64().map(|v| v as i64),
        |v, output| output.write_varint64(*v as u64)
}

varint_value! {
    /// A varint encoded 64-bit value. Can be at most 10 bytes.
    Uint64(u64) =>
        |v| raw_varint64_size(*v),
        |input| input.read_varint64(),
        |v, output| output.write_varint64(*v)
}

varint_value! {
    /// A zigzag encoded 32-bit value. Small negative values take as few bytes as small positive values.
    Sint32(i32) =>
        |v| raw_varint32_size(zigzag32(*v)),
        |input| input.read_varint32().map(unzigzag32),
        |v, output| output.write_varint32(zigzag32(*v))
}

varint_value! {
    /// A zigzag encoded 64-bit value. Small negative values take as few bytes as small positive values.
    Sint64(i64) =>
        |v| raw_varint64_size(zigzag64(*v)),
        |input| input.read_varint64().map(unzigzag64),
        |v, output| output.write_varint64(zigzag64(*v))
}

varint_value! {
    /// A bool value encoded as a single byte varint
    Bool(bool) =>
        |_v| unsafe { Length::new_unchecked(1) },
        |input| input.read_varint64().map(|v| v != 0),
        |v, output| output.write_varint32(*v as u32)
}

fixed_value! {
    /// A 32-bit value encoded as 4 little endian bytes
    Fixed32(u32), Bit32, 4,
        |input| input.read_bit32(),
        |v, output| output.write_bit32(*v)
}

fixed_value! {
    /// A 64-bit value encoded as 8 little endian bytes
    Fixed64(u64), Bit64, 8,
        |input| input.read_bit64(),
        |v, output| output.write_bit64(*v)
}

fixed_value! {
    /// A signed 32-bit value encoded as 4 little endian bytes
    Sfixed32(i32), Bit32, 4,
        |input| input.read_bit32().map(|v| v as i32),
        |v, output| output.write_bit32(*v as u32)
}

fixed_value! {
    /// A signed 64-bit value encoded as 8 little endian bytes
    Sfixed64(i64), Bit64, 8,
        |input| input.read_bit64().map(|v| v as i64),
        |v, output| output.write_bit64(*v as u64)
}

fixed_value! {
    /// A 32-bit floating point value encoded as 4 little endian bytes.
    /// Values compare and hash by their bits, so NaN values equal themselves.
    Float(f32), Bit32, 4,
        |input| input.read_bit32().map(f32::from_bits),
        |v, output| output.write_bit32(v.to_bits())
}

fixed_value! {
    /// A 64-bit floating point value encoded as 8 little endian bytes.
    /// Values compare and hash by their bits, so NaN values equal themselves.
    Double(f64), Bit64, 8,
        |input| input.read_bit64().map(f64::from_bits),
        |v, output| output.write_bit64(v.to_bits())
}

#[inline]
fn zigzag32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

#[inline]
fn unzigzag32(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

#[inline]
fn zigzag64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
fn unzigzag64(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

fn add_delimited(builder: LengthBuilder, len: usize) -> Option<LengthBuilder> {
    let len = Length::new(std::convert::TryFrom::try_from(len).ok()?)?;
    builder.add_length_delimited(len)
}

/// A length delimited UTF8 string value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct String;

impl Sealed for String { }
impl Value for String {
    type Inner = std::string::String;

    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn calculate_size(value: &Self::Inner, builder: LengthBuilder) -> Option<LengthBuilder> {
        add_delimited(builder, value.len())
    }
    fn read_new(input: &mut CodedReader) -> read::Result<Self::Inner> {
        let bytes = input.read_length_delimited()?;
        Ok(std::string::String::from_utf8(bytes)?)
    }
    fn write_to(value: &Self::Inner, output: &mut CodedWriter) -> write::Result {
        output.write_length_delimited(value.as_bytes())
    }
    fn hash_value<H: Hasher>(value: &Self::Inner, state: &mut H) {
        value.hash(state)
    }
}

/// A length delimited string of bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bytes;

impl Sealed for Bytes { }
impl Value for Bytes {
    type Inner = Vec<u8>;

    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn calculate_size(value: &Self::Inner, builder: LengthBuilder) -> Option<LengthBuilder> {
        add_delimited(builder, value.len())
    }
    fn read_new(input: &mut CodedReader) -> read::Result<Self::Inner> {
        input.read_length_delimited()
    }
    fn write_to(value: &Self::Inner, output: &mut CodedWriter) -> write::Result {
        output.write_length_delimited(value)
    }
    fn hash_value<H: Hasher>(value: &Self::Inner, state: &mut H) {
        value.hash(state)
    }
}

/// An enum value encoded as a varint of its 32-bit representation.
///
/// Values not known to the enum are preserved through its `From<i32>` conversion.
pub struct Enum<E>(PhantomData<fn() -> E>);

impl<E> Sealed for Enum<E> { }
impl<E: crate::Enum> Value for Enum<E> {
    type Inner = E;

    const WIRE_TYPE: WireType = WireType::Varint;

    fn calculate_size(value: &E, builder: LengthBuilder) -> Option<LengthBuilder> {
        Int32::calculate_size(&(*value).into(), builder)
    }
    fn read_new(input: &mut CodedReader) -> read::Result<E> {
        Int32::read_new(input).map(E::from)
    }
    fn write_to(value: &E, output: &mut CodedWriter) -> write::Result {
        Int32::write_to(&(*value).into(), output)
    }
    fn hash_value<H: Hasher>(value: &E, state: &mut H) {
        value.hash(state)
    }
}

/// A length delimited message value. Merging a message value merges it field by field.
pub struct Message<T>(PhantomData<fn() -> T>);

impl<T> Sealed for Message<T> { }
impl<T: crate::Message> Value for Message<T> {
    type Inner = T;

    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn calculate_size(value: &T, builder: LengthBuilder) -> Option<LengthBuilder> {
        let len = value.calculate_size(LengthBuilder::new())?.build();
        builder.add_length_delimited(len)
    }
    fn read_new(input: &mut CodedReader) -> read::Result<T> {
        let mut value = T::new();
        Self::merge_from(input, &mut value)?;
        Ok(value)
    }
    fn merge_from(input: &mut CodedReader, value: &mut T) -> read::Result<()> {
        let old = input.enter_message()?;
        value.merge_from(input)?;
        input.pop_length(old);
        Ok(())
    }
    fn merge(value: &mut T, other: &T) {
        value.merge(other)
    }
    fn write_to(value: &T, output: &mut CodedWriter) -> write::Result {
        let len = value.calculate_size(LengthBuilder::new()).ok_or(write::Error::ValueTooLarge)?.build();
        output.write_length(len)?;
        value.write_to(output)
    }
    fn is_initialized(value: &T) -> bool {
        value.is_initialized()
    }
    fn hash_value<H: Hasher>(value: &T, state: &mut H) {
        value.hash(state)
    }
}

/// A group value, delimited by a start and end tag.
///
/// The value itself only covers the group's fields, the end tag is written by whatever writes the start tag.
/// Reading a group value expects the start tag to be the last tag read by the reader.
pub struct Group<T>(PhantomData<fn() -> T>);

impl<T> Sealed for Group<T> { }
impl<T: crate::Message> Value for Group<T> {
    type Inner = T;

    const WIRE_TYPE: WireType = WireType::StartGroup;

    fn calculate_size(value: &T, builder: LengthBuilder) -> Option<LengthBuilder> {
        value.calculate_size(builder)
    }
    fn read_new(input: &mut CodedReader) -> read::Result<T> {
        let mut value = T::new();
        Self::merge_from(input, &mut value)?;
        Ok(value)
    }
    fn merge_from(input: &mut CodedReader, value: &mut T) -> read::Result<()> {
        let start = match input.last_tag() {
            Some(tag) if tag.wire_type() == WireType::StartGroup => tag,
            _ => return Err(read::Error::MissingEndGroup),
        };
        let old = input.enter_group(start.end_group())?;
        value.merge_from(input)?;
        input.exit_group(old)
    }
    fn merge(value: &mut T, other: &T) {
        value.merge(other)
    }
    fn write_to(value: &T, output: &mut CodedWriter) -> write::Result {
        value.write_to(output)
    }
    fn is_initialized(value: &T) -> bool {
        value.is_initialized()
    }
    fn hash_value<H: Hasher>(value: &T, state: &mut H) {
        value.hash(state)
    }
}

const WRAPPED_VALUE: FieldNumber = unsafe { FieldNumber::new_unchecked(1) };

/// A well-known wrapper message holding an optional value in field 1.
///
/// `None` is the absent wrapper. A wrapper on the wire without field 1 holds the zero value
/// of its kind, so writing `None` directly and reading it back gives `Some` of the zero value.
/// Fields in the wrapper other than its value are skipped. Merging replaces the value.
pub struct Wrapper<V>(PhantomData<fn() -> V>);

impl<V: Value> Wrapper<V> where V::Inner: Default {
    fn wrapped(value: &Option<V::Inner>) -> Option<&V::Inner> {
        value.as_ref().filter(|v| !V::value_eq(*v, &V::Inner::default()))
    }

    fn content_size(value: &Option<V::Inner>) -> Option<Length> {
        let builder = match Self::wrapped(value) {
            Some(v) => LengthBuilder::new().add_field::<V>(WRAPPED_VALUE, v)?,
            None => LengthBuilder::new(),
        };
        Some(builder.build())
    }
}

impl<V> Sealed for Wrapper<V> { }
impl<V: Value> Value for Wrapper<V> where V::Inner: Default {
    type Inner = Option<V::Inner>;

    const WIRE_TYPE: WireType = WireType::LengthDelimited;

    fn calculate_size(value: &Self::Inner, builder: LengthBuilder) -> Option<LengthBuilder> {
        builder.add_length_delimited(Self::content_size(value)?)
    }
    fn read_new(input: &mut CodedReader) -> read::Result<Self::Inner> {
        let expected = Tag::new(WRAPPED_VALUE, V::WIRE_TYPE);
        let old = input.enter_message()?;
        let mut value = V::Inner::default();
        while let Some(tag) = input.read_tag()? {
            if tag == expected {
                value = V::read_new(input)?;
            } else {
                input.skip()?;
            }
        }
        input.pop_length(old);
        Ok(Some(value))
    }
    fn merge(value: &mut Self::Inner, other: &Self::Inner) {
        if other.is_some() {
            value.clone_from(other);
        }
    }
    fn write_to(value: &Self::Inner, output: &mut CodedWriter) -> write::Result {
        let len = Self::content_size(value).ok_or(write::Error::ValueTooLarge)?;
        output.write_length(len)?;
        match Self::wrapped(value) {
            Some(v) => output.write_field::<V>(WRAPPED_VALUE, v),
            None => Ok(()),
        }
    }
    fn value_eq(a: &Self::Inner, b: &Self::Inner) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => V::value_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
    fn hash_value<H: Hasher>(value: &Self::Inner, state: &mut H) {
        value.is_some().hash(state);
        if let Some(v) = value {
            V::hash_value(v, state);
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use crate::io::{read, CodedReader, CodedWriter, Length};
    use super::*;

    fn round_trip<V: Value>(value: &V::Inner) -> V::Inner {
        let len = Length::of_value::<V>(value).unwrap().get() as usize;
        let mut output = vec![0u8; len];
        let mut writer = CodedWriter::with_slice(&mut output);
        V::write_to(value, &mut writer).unwrap();

        let mut reader = CodedReader::with_slice(&output);
        let result = V::read_new(&mut reader).unwrap();
        assert_matches!(reader.read_tag(), Ok(None));
        result
    }

    fn hash_of<V: Value>(value: &V::Inner) -> u64 {
        let mut hasher = DefaultHasher::new();
        V::hash_value(value, &mut hasher);
        hasher.finish()
    }

    #[test]
    fn int32_boundaries() {
        assert_eq!(round_trip::<Int32>(&i32::min_value()), i32::min_value());
        assert_eq!(round_trip::<Int32>(&i32::max_value()), i32::max_value());
        assert_eq!(Length::of_value::<Int32>(&-1).unwrap().get(), 10);
    }
    #[test]
    fn uint64_max() {
        assert_eq!(round_trip::<Uint64>(&u64::max_value()), u64::max_value());
    }
    #[test]
    fn sint32_negative_one() {
        assert_eq!(round_trip::<Sint32>(&-1), -1);
        assert_eq!(Length::of_value::<Sint32>(&-1).unwrap().get(), 1);
        assert_eq!(zigzag32(-1), 1);
        assert_eq!(zigzag64(i64::min_value()), u64::max_value());
    }
    #[test]
    fn float_specials() {
        for value in &[f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let result = round_trip::<Float>(value);
            assert_eq!(result.to_bits(), value.to_bits());
            assert!(Float::value_eq(&result, value));
            assert_eq!(hash_of::<Float>(&result), hash_of::<Float>(value));
        }
        assert!(round_trip::<Float>(&f32::NAN).is_nan());
    }
    #[test]
    fn double_specials() {
        for value in &[f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let result = round_trip::<Double>(value);
            assert_eq!(result.to_bits(), value.to_bits());
            assert!(Double::value_eq(&result, value));
        }
        assert!(round_trip::<Double>(&f64::NAN).is_nan());
    }
    #[test]
    fn string_sizes_include_prefix() {
        let value = "hello".to_owned();
        assert_eq!(Length::of_value::<String>(&value).unwrap().get(), 6);
        assert_eq!(round_trip::<String>(&value), value);
    }
    #[test]
    fn invalid_utf8() {
        let data = [2, 0xC3, 0x28];
        let mut reader = CodedReader::with_slice(&data);
        assert_matches!(String::read_new(&mut reader), Err(read::Error::InvalidString(_)));
    }
    #[test]
    fn bool_reads_any_nonzero() {
        let data = [0x80, 0x01];
        let mut reader = CodedReader::with_slice(&data);
        assert_eq!(Bool::read_new(&mut reader).unwrap(), true);
    }

    #[derive(Clone, Copy, Debug, PartialEq, Hash)]
    enum Color {
        Red,
        Other(i32),
    }

    impl From<i32> for Color {
        fn from(value: i32) -> Color {
            match value {
                0 => Color::Red,
                other => Color::Other(other),
            }
        }
    }

    impl From<Color> for i32 {
        fn from(value: Color) -> i32 {
            match value {
                Color::Red => 0,
                Color::Other(other) => other,
            }
        }
    }

    impl crate::Enum for Color { }

    #[test]
    fn enums_keep_unknown_values() {
        assert_eq!(round_trip::<Enum<Color>>(&Color::Red), Color::Red);
        assert_eq!(round_trip::<Enum<Color>>(&Color::Other(-3)), Color::Other(-3));
    }

    fn encode<V: Value>(value: &V::Inner) -> Vec<u8> {
        let len = Length::of_value::<V>(value).unwrap().get() as usize;
        let mut output = vec![0u8; len];
        V::write_to(value, &mut CodedWriter::with_slice(&mut output)).unwrap();
        output
    }

    #[test]
    fn wrappers() {
        assert_eq!(encode::<Wrapper<Int32>>(&Some(5)), [2, 8, 5]);
        assert_eq!(round_trip::<Wrapper<Int32>>(&Some(5)), Some(5));

        // zero and absent values leave the wrapper empty
        assert_eq!(encode::<Wrapper<Int32>>(&Some(0)), [0]);
        assert_eq!(encode::<Wrapper<Int32>>(&None), [0]);
        assert_eq!(round_trip::<Wrapper<Int32>>(&None), Some(0));

        let value = Some("wrapped".to_owned());
        assert_eq!(Length::of_value::<Wrapper<String>>(&value).unwrap().get(), 10);
        assert_eq!(round_trip::<Wrapper<String>>(&value), value);
    }
    #[test]
    fn wrappers_skip_other_fields() {
        // field 2 varint, then the value in field 1, then a field 1 with the wrong wire type
        let data = [9, 16, 1, 8, 7, 13, 1, 0, 0, 0];
        let mut reader = CodedReader::with_slice(&data);
        assert_eq!(Wrapper::<Int32>::read_new(&mut reader).unwrap(), Some(7));
        assert_matches!(reader.read_tag(), Ok(None));
    }
    #[test]
    fn wrapper_merge_and_compare() {
        let mut value = Some(1.5f64);
        Wrapper::<Double>::merge(&mut value, &None);
        assert_eq!(value, Some(1.5));
        Wrapper::<Double>::merge(&mut value, &Some(2.5));
        assert_eq!(value, Some(2.5));

        assert!(Wrapper::<Double>::value_eq(&Some(f64::NAN), &Some(f64::NAN)));
        assert!(!Wrapper::<Double>::value_eq(&None, &Some(0.0)));
        assert_ne!(hash_of::<Wrapper<Int32>>(&None), hash_of::<Wrapper<Int32>>(&Some(0)));
    }

    proptest! {
        #[test]
        fn wrapper_round_trip(value: Option<u64>) {
            let expected = Some(value.unwrap_or_default());
            prop_assert_eq!(round_trip::<Wrapper<Uint64>>(&value), expected);
            prop_assert_eq!(encode::<Wrapper<Uint64>>(&value).len() as i32, Length::of_value::<Wrapper<Uint64>>(&value).unwrap().get());
        }

        #[test]
        fn int64_round_trip(value: i64) {
            prop_assert_eq!(round_trip::<Int64>(&value), value);
            prop_assert_eq!(round_trip::<Sint64>(&value), value);
            prop_assert_eq!(round_trip::<Sfixed64>(&value), value);
        }

        #[test]
        fn int32_round_trip(value: i32) {
            prop_assert_eq!(round_trip::<Int32>(&value), value);
            prop_assert_eq!(round_trip::<Sint32>(&value), value);
            prop_assert_eq!(round_trip::<Sfixed32>(&value), value);
        }

        #[test]
        fn bytes_round_trip(value in proptest::collection::vec(any::<u8>(), 0..300)) {
            prop_assert_eq!(round_trip::<Bytes>(&value), value);
        }
    }
}
