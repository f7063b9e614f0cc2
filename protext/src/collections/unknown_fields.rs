//! Defines the `UnknownFieldSet`, a struct used to contain unknown fields as they were read from coded readers.
//!
//! As APIs are updated, certain fields may be removed or added from proto file definitions. If an old version of a message
//! encounters fields it doesn't recognize it can still read them to be returned again via unknown fields.
//!
//! Unknown fields for unique field numbers can exist for multiple wire types at once to ensure that all data is properly returned.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use crate::{internal::Sealed, Mergable};
use crate::io::{read, write, FieldNumber, WireType, Tag, Length, LengthBuilder, CodedReader, CodedWriter};
use crate::raw;
use hashbrown::HashMap;
use super::{FieldSet, TryRead};

/// An unknown field in an [`UnknownFieldSet`](struct.UnknownFieldSet.html).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnknownField {
    /// A varint field value
    Varint(u64),
    /// A 64-bit field value
    Bit64(u64),
    /// A length delimited series of bytes
    LengthDelimited(Vec<u8>),
    /// A group of other unknown fields
    Group(UnknownFieldSet),
    /// A 32-bit field value
    Bit32(u32)
}

impl UnknownField {
    /// Gets the wire type this field is written with
    pub fn wire_type(&self) -> WireType {
        match self {
            UnknownField::Varint(_) => WireType::Varint,
            UnknownField::Bit64(_) => WireType::Bit64,
            UnknownField::LengthDelimited(_) => WireType::LengthDelimited,
            UnknownField::Group(_) => WireType::StartGroup,
            UnknownField::Bit32(_) => WireType::Bit32,
        }
    }
}

/// A set of unknown fields encountered while parsing
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct UnknownFieldSet {
    inner: HashMap<FieldNumber, Vec<UnknownField>>,
}

impl Hash for UnknownFieldSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // fields are stored in no particular order, so entries are folded together
        let folded = self.inner.iter().fold(0u64, |acc, entry| {
            let mut hasher = DefaultHasher::new();
            entry.hash(&mut hasher);
            acc ^ hasher.finish()
        });
        self.inner.len().hash(state);
        folded.hash(state);
    }
}

impl Sealed for UnknownFieldSet { }
impl Mergable for UnknownFieldSet {
    fn merge(&mut self, other: &Self) {
        for (key, values) in &other.inner {
            self.inner.entry(*key).or_insert_with(Vec::new).extend(values.iter().cloned())
        }
    }
}
impl FieldSet for UnknownFieldSet {
    #[inline]
    fn try_add_field_from<'a, 'b>(&mut self, input: &'a mut CodedReader<'b>) -> read::Result<TryRead<'a, 'b>> {
        if input.skip_unknown_fields() {
            Ok(TryRead::Yielded(input))
        } else {
            self.add_field_from(input)?;
            Ok(TryRead::Consumed)
        }
    }
    fn calculate_size(&self, builder: LengthBuilder) -> Option<LengthBuilder> {
        self.inner
            .iter()
            .try_fold(builder, |builder, (key, values)|
                values
                    .iter()
                    .try_fold(builder, |builder, value| {
                        let tag = Tag::new(*key, value.wire_type());
                        let builder = builder.add_tag(tag)?;
                        match value {
                            UnknownField::Varint(v) => builder.add_value::<raw::Uint64>(v),
                            UnknownField::Bit64(v) => builder.add_value::<raw::Fixed64>(v),
                            UnknownField::LengthDelimited(v) => builder.add_length_delimited(Length::of_slice(v)?),
                            UnknownField::Group(v) => builder.add_fields(v)?.add_tag(tag.end_group()),
                            UnknownField::Bit32(v) => builder.add_value::<raw::Fixed32>(v),
                        }
                })
            )
    }
    fn write_to(&self, output: &mut CodedWriter) -> write::Result {
        for (key, values) in &self.inner {
            for value in values {
                let tag = Tag::new(*key, value.wire_type());
                output.write_tag(tag)?;
                match value {
                    UnknownField::Varint(v) => output.write_varint64(*v)?,
                    UnknownField::Bit64(v) => output.write_bit64(*v)?,
                    UnknownField::LengthDelimited(v) => output.write_length_delimited(v)?,
                    UnknownField::Group(v) => {
                        output.write_fields(v)?;
                        output.write_tag(tag.end_group())?;
                    },
                    UnknownField::Bit32(v) => output.write_bit32(*v)?,
                }
            }
        }
        Ok(())
    }
    fn is_initialized(&self) -> bool { true }
}
impl UnknownFieldSet {
    fn add_field_from(&mut self, input: &mut CodedReader) -> read::Result<()> {
        if let Some(last_tag) = input.last_tag() {
            let num = last_tag.field();
            match last_tag.wire_type() {
                WireType::Varint => self.push_value(num, UnknownField::Varint(input.read_varint64()?)),
                WireType::Bit64 => self.push_value(num, UnknownField::Bit64(input.read_bit64()?)),
                WireType::LengthDelimited => self.push_value(num, UnknownField::LengthDelimited(input.read_length_delimited()?)),
                WireType::StartGroup => {
                    let mut group = UnknownFieldSet::new();
                    let old = input.enter_group(last_tag.end_group())?;
                    while input.read_tag()?.is_some() {
                        group.add_field_from(input)?;
                    }
                    input.exit_group(old)?;
                    self.push_value(num, UnknownField::Group(group));
                },
                WireType::Bit32 => self.push_value(num, UnknownField::Bit32(input.read_bit32()?)),
                WireType::EndGroup => return Err(read::Error::InvalidTag(last_tag.get())),
            }
        }
        Ok(())
    }
}
impl UnknownFieldSet {
    /// Creates a new empty unknown field set
    pub fn new() -> Self {
        Self {
            inner: Default::default(),
        }
    }
    /// Gets the number of fields present in this set
    pub fn field_len(&self) -> usize {
        self.inner.len()
    }
    /// Returns if the set has no fields
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
    /// Returns a slice of values for a field
    pub fn values(&self, num: FieldNumber) -> &[UnknownField] {
        self.inner.get(&num).map(Vec::as_slice).unwrap_or(&[])
    }
    /// Pushes an new value to the field
    pub fn push_value(&mut self, num: FieldNumber, value: UnknownField) {
        self.inner.entry(num).or_insert_with(Vec::new).push(value)
    }
    /// Pops the last value added for the specified field
    pub fn pop_value(&mut self, num: FieldNumber) -> Option<UnknownField> {
        self.inner.get_mut(&num).and_then(Vec::pop)
    }
    /// Clears the set, removing all fields
    pub fn clear(&mut self) {
        self.inner.clear()
    }
}

#[cfg(test)]
mod test {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use assert_matches::assert_matches;
    use crate::collections::{FieldSet, TryRead};
    use crate::io::{read, CodedReader, CodedWriter, FieldNumber, LengthBuilder, ReaderBuilder};
    use crate::Mergable;
    use super::{UnknownField, UnknownFieldSet};

    fn num(n: u32) -> FieldNumber {
        FieldNumber::new(n).unwrap()
    }

    fn read_all(data: &[u8]) -> UnknownFieldSet {
        let mut set = UnknownFieldSet::new();
        let mut reader = CodedReader::with_slice(data);
        while let Some(_) = reader.read_tag().unwrap() {
            reader.try_add_field_to(&mut set).unwrap().or_skip().unwrap();
        }
        set
    }

    fn hash_of(set: &UnknownFieldSet) -> u64 {
        let mut hasher = DefaultHasher::new();
        set.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn reads_every_wire_type() {
        let data = [
            8, 150, 1,
            17, 1, 0, 0, 0, 0, 0, 0, 0,
            26, 2, 0xAA, 0xBB,
            37, 2, 0, 0, 0,
            43, 8, 1, 44,
        ];
        let set = read_all(&data);

        assert_eq!(set.values(num(1)), &[UnknownField::Varint(150)]);
        assert_eq!(set.values(num(2)), &[UnknownField::Bit64(1)]);
        assert_eq!(set.values(num(3)), &[UnknownField::LengthDelimited(vec![0xAA, 0xBB])]);
        assert_eq!(set.values(num(4)), &[UnknownField::Bit32(2)]);
        assert_matches!(set.values(num(5)), [UnknownField::Group(group)] if group.values(num(1)) == [UnknownField::Varint(1)]);

        let len = LengthBuilder::new().add_fields(&set).unwrap().build().get() as usize;
        assert_eq!(len, data.len());

        let mut output = vec![0u8; len];
        set.write_to(&mut CodedWriter::with_slice(&mut output)).unwrap();
        assert_eq!(read_all(&output), set);
    }
    #[test]
    fn skips_when_configured() {
        let data = [8, 1];
        let mut set = UnknownFieldSet::new();
        let mut reader = ReaderBuilder::new().skip_unknown_fields(true).with_slice(&data);
        reader.read_tag().unwrap();

        assert_matches!(set.try_add_field_from(&mut reader), Ok(TryRead::Yielded(_)));
        assert!(set.is_empty());
    }
    #[test]
    fn unclosed_group_fails() {
        let data = [43, 8, 1];
        let mut set = UnknownFieldSet::new();
        let mut reader = CodedReader::with_slice(&data);
        reader.read_tag().unwrap();

        assert_matches!(set.try_add_field_from(&mut reader), Err(read::Error::MissingEndGroup));
    }
    #[test]
    fn deeply_nested_groups_fail() {
        let mut data = vec![11u8; 150];
        data.extend(vec![12u8; 150]);
        let mut set = UnknownFieldSet::new();
        let mut reader = CodedReader::with_slice(&data);
        reader.read_tag().unwrap();

        assert_matches!(set.try_add_field_from(&mut reader), Err(read::Error::RecursionLimitExceeded));

        let mut reader = ReaderBuilder::new().recursion_limit(200).with_slice(&data);
        reader.read_tag().unwrap();
        assert_matches!(set.try_add_field_from(&mut reader), Ok(TryRead::Consumed));
        assert_eq!(set.values(num(1)).len(), 1);
    }
    #[test]
    fn order_independent_hash() {
        let mut a = UnknownFieldSet::new();
        a.push_value(num(1), UnknownField::Varint(1));
        a.push_value(num(2), UnknownField::Bit32(2));

        let mut b = UnknownFieldSet::new();
        b.push_value(num(2), UnknownField::Bit32(2));
        b.push_value(num(1), UnknownField::Varint(1));

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }
    #[test]
    fn merge_appends() {
        let mut a = UnknownFieldSet::new();
        a.push_value(num(1), UnknownField::Varint(1));
        let mut b = UnknownFieldSet::new();
        b.push_value(num(1), UnknownField::Varint(2));

        a.merge(&b);
        assert_eq!(a.values(num(1)), &[UnknownField::Varint(1), UnknownField::Varint(2)]);
        assert_eq!(a.pop_value(num(1)), Some(UnknownField::Varint(2)));
    }
}
