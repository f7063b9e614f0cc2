//! Host messages and extensions written the way generated code writes them.

#![allow(dead_code)]

use std::sync::OnceLock;
use protext::{raw, ExtendableMessage, Extension, ExtensionRegistry, ExtensionSet, FieldCodec, Mergable, Message, RepeatedExtension, UnknownFieldSet};
use protext::collections::FieldSet;
use protext::extend::registry::RegistryBuilder;
use protext::io::{read, write, CodedReader, CodedWriter, FieldNumber, LengthBuilder, Tag, WireType};

const fn tag(num: u32, wire_type: WireType) -> Tag {
    Tag::new(unsafe { FieldNumber::new_unchecked(num) }, wire_type)
}

macro_rules! extendable_message {
    ($name:ident) => {
        #[derive(Default, Clone, Debug, PartialEq, Hash)]
        pub struct $name {
            extensions: ExtensionSet<$name>,
            unknown_fields: UnknownFieldSet,
        }

        impl Mergable for $name {
            fn merge(&mut self, other: &Self) {
                self.extensions.merge(&other.extensions);
                self.unknown_fields.merge(&other.unknown_fields);
            }
        }

        impl Message for $name {
            fn merge_from(&mut self, input: &mut CodedReader) -> read::Result<()> {
                while let Some(_) = input.read_tag()? {
                    input.try_add_field_to(&mut self.extensions)?
                        .or_try(&mut self.unknown_fields)?
                        .or_skip()?;
                }
                Ok(())
            }
            fn calculate_size(&self, builder: LengthBuilder) -> Option<LengthBuilder> {
                builder
                    .add_fields(&self.extensions)?
                    .add_fields(&self.unknown_fields)
            }
            fn write_to(&self, output: &mut CodedWriter) -> write::Result {
                output.write_fields(&self.extensions)?;
                output.write_fields(&self.unknown_fields)?;
                Ok(())
            }
            fn is_initialized(&self) -> bool {
                FieldSet::is_initialized(&self.extensions)
            }

            fn unknown_fields(&self) -> &UnknownFieldSet {
                &self.unknown_fields
            }
            fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
                &mut self.unknown_fields
            }
        }

        impl ExtendableMessage for $name {
            fn extensions(&self) -> &ExtensionSet<Self> {
                &self.extensions
            }
            fn extensions_mut(&mut self) -> &mut ExtensionSet<Self> {
                &mut self.extensions
            }
        }
    };
}

extendable_message!(TestAllExtensions);
extendable_message!(TestOtherExtensions);

#[derive(Default, Clone, Debug, PartialEq, Hash)]
pub struct ComplexOptionType1 {
    foo: i32,
    bar: i32,
    unknown_fields: UnknownFieldSet,
}

impl ComplexOptionType1 {
    pub const FOO_NUMBER: FieldNumber = unsafe { FieldNumber::new_unchecked(1) };
    pub fn foo(&self) -> &i32 {
        &self.foo
    }
    pub fn foo_mut(&mut self) -> &mut i32 {
        &mut self.foo
    }

    pub const BAR_NUMBER: FieldNumber = unsafe { FieldNumber::new_unchecked(2) };
    pub fn bar(&self) -> &i32 {
        &self.bar
    }
    pub fn bar_mut(&mut self) -> &mut i32 {
        &mut self.bar
    }
}

impl Mergable for ComplexOptionType1 {
    fn merge(&mut self, other: &Self) {
        if other.foo != 0 {
            self.foo = other.foo;
        }
        if other.bar != 0 {
            self.bar = other.bar;
        }
        self.unknown_fields.merge(&other.unknown_fields);
    }
}

impl Message for ComplexOptionType1 {
    fn merge_from(&mut self, input: &mut CodedReader) -> read::Result<()> {
        while let Some(tag) = input.read_tag()? {
            match tag.get() {
                8 => input.merge_value::<raw::Int32>(&mut self.foo)?,
                16 => input.merge_value::<raw::Int32>(&mut self.bar)?,
                _ => input.try_add_field_to(&mut self.unknown_fields)?.or_skip()?,
            }
        }
        Ok(())
    }
    fn calculate_size(&self, mut builder: LengthBuilder) -> Option<LengthBuilder> {
        if self.foo != 0 {
            builder = builder.add_field::<raw::Int32>(Self::FOO_NUMBER, self.foo())?;
        }
        if self.bar != 0 {
            builder = builder.add_field::<raw::Int32>(Self::BAR_NUMBER, self.bar())?;
        }
        builder.add_fields(&self.unknown_fields)
    }
    fn write_to(&self, output: &mut CodedWriter) -> write::Result {
        if self.foo != 0 {
            output.write_field::<raw::Int32>(Self::FOO_NUMBER, &self.foo)?;
        }
        if self.bar != 0 {
            output.write_field::<raw::Int32>(Self::BAR_NUMBER, &self.bar)?;
        }
        output.write_fields(&self.unknown_fields)
    }
    fn is_initialized(&self) -> bool {
        true
    }

    fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown_fields
    }
    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
        &mut self.unknown_fields
    }
}

pub fn complex(foo: i32, bar: i32) -> ComplexOptionType1 {
    let mut value = ComplexOptionType1::new();
    *value.foo_mut() = foo;
    *value.bar_mut() = bar;
    value
}

/// A message with a single required field
#[derive(Default, Clone, Debug, PartialEq, Hash)]
pub struct TestRequired {
    a: Option<i32>,
    unknown_fields: UnknownFieldSet,
}

impl TestRequired {
    pub const A_NUMBER: FieldNumber = unsafe { FieldNumber::new_unchecked(1) };
    pub fn with_a(a: i32) -> Self {
        Self { a: Some(a), ..Self::new() }
    }
    pub fn a(&self) -> Option<i32> {
        self.a
    }
}

impl Mergable for TestRequired {
    fn merge(&mut self, other: &Self) {
        if other.a.is_some() {
            self.a = other.a;
        }
        self.unknown_fields.merge(&other.unknown_fields);
    }
}

impl Message for TestRequired {
    fn merge_from(&mut self, input: &mut CodedReader) -> read::Result<()> {
        while let Some(tag) = input.read_tag()? {
            match tag.get() {
                8 => self.a = Some(input.read_value::<raw::Int32>()?),
                _ => input.try_add_field_to(&mut self.unknown_fields)?.or_skip()?,
            }
        }
        Ok(())
    }
    fn calculate_size(&self, mut builder: LengthBuilder) -> Option<LengthBuilder> {
        if let Some(a) = &self.a {
            builder = builder.add_field::<raw::Int32>(Self::A_NUMBER, a)?;
        }
        builder.add_fields(&self.unknown_fields)
    }
    fn write_to(&self, output: &mut CodedWriter) -> write::Result {
        if let Some(a) = &self.a {
            output.write_field::<raw::Int32>(Self::A_NUMBER, a)?;
        }
        output.write_fields(&self.unknown_fields)
    }
    fn is_initialized(&self) -> bool {
        self.a.is_some()
    }

    fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown_fields
    }
    fn unknown_fields_mut(&mut self) -> &mut UnknownFieldSet {
        &mut self.unknown_fields
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForeignEnum {
    Foo,
    Bar,
    Baz,
    Unrecognized(i32),
}

impl From<i32> for ForeignEnum {
    fn from(value: i32) -> Self {
        match value {
            4 => ForeignEnum::Foo,
            5 => ForeignEnum::Bar,
            6 => ForeignEnum::Baz,
            other => ForeignEnum::Unrecognized(other),
        }
    }
}

impl From<ForeignEnum> for i32 {
    fn from(value: ForeignEnum) -> i32 {
        match value {
            ForeignEnum::Foo => 4,
            ForeignEnum::Bar => 5,
            ForeignEnum::Baz => 6,
            ForeignEnum::Unrecognized(other) => other,
        }
    }
}

impl protext::Enum for ForeignEnum { }

pub static BOOL_OPT: Extension<TestAllExtensions, raw::Bool> =
    Extension::new(FieldCodec::new(tag(10, WireType::Varint), false));
pub static INT32_OPT: Extension<TestAllExtensions, raw::Int32> =
    Extension::new(FieldCodec::new(tag(11, WireType::Varint), 0));
pub static SINT32_OPT: Extension<TestAllExtensions, raw::Sint32> =
    Extension::new(FieldCodec::new(tag(12, WireType::Varint), 0));
pub static UINT64_OPT: Extension<TestAllExtensions, raw::Uint64> =
    Extension::new(FieldCodec::new(tag(13, WireType::Varint), 0));
pub static FLOAT_OPT: Extension<TestAllExtensions, raw::Float> =
    Extension::new(FieldCodec::new(tag(14, WireType::Bit32), 0.0));
pub static DOUBLE_OPT: Extension<TestAllExtensions, raw::Double> =
    Extension::new(FieldCodec::new(tag(15, WireType::Bit64), 0.0));
pub static STRING_OPT: Extension<TestAllExtensions, raw::String> =
    Extension::new(FieldCodec::new(tag(16, WireType::LengthDelimited), String::new()));
pub static BYTES_OPT: Extension<TestAllExtensions, raw::Bytes> =
    Extension::new(FieldCodec::new(tag(17, WireType::LengthDelimited), Vec::new()));
pub static DEFAULT_INT32_OPT: Extension<TestAllExtensions, raw::Int32> =
    Extension::new(FieldCodec::new(tag(18, WireType::Varint), 42));

pub static REPEATED_INT32: RepeatedExtension<TestAllExtensions, raw::Int32> =
    RepeatedExtension::new(FieldCodec::new(tag(20, WireType::Varint), 0));
pub static PACKED_INT32: RepeatedExtension<TestAllExtensions, raw::Int32> =
    RepeatedExtension::new(FieldCodec::new(tag(21, WireType::LengthDelimited), 0));
pub static REPEATED_FIXED32: RepeatedExtension<TestAllExtensions, raw::Fixed32> =
    RepeatedExtension::new(FieldCodec::new(tag(22, WireType::Bit32), 0));
pub static REPEATED_STRING: RepeatedExtension<TestAllExtensions, raw::String> =
    RepeatedExtension::new(FieldCodec::new(tag(23, WireType::LengthDelimited), String::new()));

pub static WRAPPED_INT32_OPT: Extension<TestAllExtensions, raw::Wrapper<raw::Int32>> =
    Extension::new(FieldCodec::new(tag(19, WireType::LengthDelimited), None));
pub static ENUM_OPT: Extension<TestAllExtensions, raw::Enum<ForeignEnum>> =
    Extension::new(FieldCodec::new(tag(24, WireType::Varint), ForeignEnum::Foo));
pub static REPEATED_ENUM: RepeatedExtension<TestAllExtensions, raw::Enum<ForeignEnum>> =
    RepeatedExtension::new(FieldCodec::new(tag(25, WireType::Varint), ForeignEnum::Foo));

/// Shares field number 11 with `INT32_OPT`
pub static CONFLICTING_INT64: Extension<TestAllExtensions, raw::Int64> =
    Extension::new(FieldCodec::new(tag(11, WireType::Varint), 0));

pub static OTHER_INT32: Extension<TestOtherExtensions, raw::Int32> =
    Extension::new(FieldCodec::new(tag(11, WireType::Varint), 0));

pub fn message_opt() -> &'static Extension<TestAllExtensions, raw::Message<ComplexOptionType1>> {
    static EXTENSION: OnceLock<Extension<TestAllExtensions, raw::Message<ComplexOptionType1>>> = OnceLock::new();
    EXTENSION.get_or_init(|| Extension::new(FieldCodec::new(tag(30, WireType::LengthDelimited), ComplexOptionType1::new())))
}

pub fn group_opt() -> &'static Extension<TestAllExtensions, raw::Group<ComplexOptionType1>> {
    static EXTENSION: OnceLock<Extension<TestAllExtensions, raw::Group<ComplexOptionType1>>> = OnceLock::new();
    EXTENSION.get_or_init(|| Extension::new(FieldCodec::new(tag(31, WireType::StartGroup), ComplexOptionType1::new())))
}

pub fn required_opt() -> &'static Extension<TestAllExtensions, raw::Message<TestRequired>> {
    static EXTENSION: OnceLock<Extension<TestAllExtensions, raw::Message<TestRequired>>> = OnceLock::new();
    EXTENSION.get_or_init(|| Extension::new(FieldCodec::new(tag(32, WireType::LengthDelimited), TestRequired::new())))
}

pub fn repeated_required() -> &'static RepeatedExtension<TestAllExtensions, raw::Message<TestRequired>> {
    static EXTENSION: OnceLock<RepeatedExtension<TestAllExtensions, raw::Message<TestRequired>>> = OnceLock::new();
    EXTENSION.get_or_init(|| RepeatedExtension::new(FieldCodec::new(tag(33, WireType::LengthDelimited), TestRequired::new())))
}

pub fn repeated_message() -> &'static RepeatedExtension<TestAllExtensions, raw::Message<ComplexOptionType1>> {
    static EXTENSION: OnceLock<RepeatedExtension<TestAllExtensions, raw::Message<ComplexOptionType1>>> = OnceLock::new();
    EXTENSION.get_or_init(|| RepeatedExtension::new(FieldCodec::new(tag(34, WireType::LengthDelimited), ComplexOptionType1::new())))
}

pub fn repeated_group() -> &'static RepeatedExtension<TestAllExtensions, raw::Group<ComplexOptionType1>> {
    static EXTENSION: OnceLock<RepeatedExtension<TestAllExtensions, raw::Group<ComplexOptionType1>>> = OnceLock::new();
    EXTENSION.get_or_init(|| RepeatedExtension::new(FieldCodec::new(tag(35, WireType::StartGroup), ComplexOptionType1::new())))
}

/// A registry with every extension of `TestAllExtensions` except `CONFLICTING_INT64`
pub fn registry() -> &'static ExtensionRegistry {
    static REGISTRY: OnceLock<ExtensionRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        RegistryBuilder::new()
            .add_identifier(&BOOL_OPT).unwrap()
            .add_identifier(&INT32_OPT).unwrap()
            .add_identifier(&SINT32_OPT).unwrap()
            .add_identifier(&UINT64_OPT).unwrap()
            .add_identifier(&FLOAT_OPT).unwrap()
            .add_identifier(&DOUBLE_OPT).unwrap()
            .add_identifier(&STRING_OPT).unwrap()
            .add_identifier(&BYTES_OPT).unwrap()
            .add_identifier(&DEFAULT_INT32_OPT).unwrap()
            .add_identifier(&REPEATED_INT32).unwrap()
            .add_identifier(&PACKED_INT32).unwrap()
            .add_identifier(&REPEATED_FIXED32).unwrap()
            .add_identifier(&REPEATED_STRING).unwrap()
            .add_identifier(message_opt()).unwrap()
            .add_identifier(group_opt()).unwrap()
            .add_identifier(&WRAPPED_INT32_OPT).unwrap()
            .add_identifier(&ENUM_OPT).unwrap()
            .add_identifier(&REPEATED_ENUM).unwrap()
            .add_identifier(required_opt()).unwrap()
            .add_identifier(repeated_required()).unwrap()
            .add_identifier(repeated_message()).unwrap()
            .add_identifier(repeated_group()).unwrap()
            .build()
    })
}

/// Reads a message with every known extension registered beforehand
pub fn parse(data: &[u8]) -> read::Result<TestAllExtensions> {
    let mut message = TestAllExtensions::new();
    registry().register_extensions_for(&mut message).unwrap();
    message.merge_from(&mut CodedReader::with_slice(data))?;
    Ok(message)
}
