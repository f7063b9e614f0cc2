//! Defines the `CodedWriter`, a writer for writing protobuf encoded values to streams.

use std::io::{self, Write};
use std::mem;
use crate::collections::{RepeatedValue, FieldSet};
use crate::io::{FieldNumber, Length, Tag, WireType};
use crate::raw::Value;
use either::{Either, Left, Right};
use thiserror::Error;

/// The error type for [`CodedWriter`](struct.CodedWriter.html)
#[derive(Debug, Error)]
pub enum Error {
    /// An error used to indicate a value was provided that was
    /// too large to write to an output.
    #[error("the value was too large to write to the output")]
    ValueTooLarge,
    /// An error occured while writing data to the output.
    /// For slice outputs, this is used to indicate if
    /// not all data could be written to the slice.
    #[error("an error occured while writing to the output")]
    IoError(#[from] io::Error),
}

/// A result for a [`CodedWriter`](struct.CodedWriter.html) write operation
pub type Result = std::result::Result<(), Error>;

/// A coded output writer that writes to a borrowed [`Write`] or a mutable slice of bytes.
///
/// [`Write`]: https://doc.rust-lang.org/std/io/trait.Write.html
pub struct CodedWriter<'a> {
    inner: Either<&'a mut dyn Write, &'a mut [u8]>
}

impl<'a> CodedWriter<'a> {
    /// Creates a new [`CodedWriter`] over the borrowed [`Write`].
    ///
    /// [`CodedWriter`]: struct.CodedWriter.html
    /// [`Write`]: https://doc.rust-lang.org/std/io/trait.Write.html
    #[inline]
    pub fn with_write(inner: &'a mut dyn Write) -> Self {
        Self { inner: Left(inner) }
    }
    /// Creates a new [`CodedWriter`] over the borrowed slice. Writing past the end of the slice fails.
    ///
    /// [`CodedWriter`]: struct.CodedWriter.html
    #[inline]
    pub fn with_slice(inner: &'a mut [u8]) -> Self {
        Self { inner: Right(inner) }
    }

    /// Writes raw bytes to the output. This should be used carefully as to not corrupt the coded output.
    #[inline]
    pub fn write_bytes(&mut self, value: &[u8]) -> Result {
        match &mut self.inner {
            Left(writer) => writer.write_all(value)?,
            Right(buf) => {
                if value.len() > buf.len() {
                    return Err(io::Error::from(io::ErrorKind::WriteZero).into());
                }
                let (head, tail) = mem::take(buf).split_at_mut(value.len());
                head.copy_from_slice(value);
                *buf = tail;
            }
        }
        Ok(())
    }

    /// Writes a tag to the output.
    #[inline]
    pub fn write_tag(&mut self, tag: Tag) -> Result {
        self.write_varint32(tag.get())
    }

    /// Writes a length to the output.
    #[inline]
    pub fn write_length(&mut self, length: Length) -> Result {
        self.write_varint32(length.get() as u32)
    }

    /// Writes a 32-bit varint to the output. This is the same as upcasting
    /// the value to a u64 and writing that.
    #[inline]
    pub fn write_varint32(&mut self, value: u32) -> Result {
        self.write_varint64(value as u64)
    }

    /// Writes a 64-bit varint to the output.
    #[inline]
    pub fn write_varint64(&mut self, mut value: u64) -> Result {
        let mut buf = [0u8; 10];
        let mut i = 0;
        while value >= 0x80 {
            buf[i] = (value as u8) | 0x80;
            value >>= 7;
            i += 1;
        }
        buf[i] = value as u8;
        self.write_bytes(&buf[..=i])
    }

    /// Writes a 32-bit little endian integer to the output.
    #[inline]
    pub fn write_bit32(&mut self, value: u32) -> Result {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a 64-bit little endian integer to the output.
    #[inline]
    pub fn write_bit64(&mut self, value: u64) -> Result {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a length delimited set of bytes to the output.
    #[inline]
    pub fn write_length_delimited(&mut self, value: &[u8]) -> Result {
        let len = Length::of_slice(value).ok_or(Error::ValueTooLarge)?;
        self.write_length(len)?;
        self.write_bytes(value)
    }

    /// Writes a generic value to the output.
    #[inline]
    pub fn write_value<V: Value>(&mut self, value: &V::Inner) -> Result {
        V::write_to(value, self)
    }

    /// Writes a generic value with a tag to the output based on the provided field number.
    /// Groups are closed with their end tag.
    #[inline]
    pub fn write_field<V: Value>(&mut self, num: FieldNumber, value: &V::Inner) -> Result {
        let tag = Tag::new(num, V::WIRE_TYPE);
        self.write_tag(tag)?;
        self.write_value::<V>(value)?;
        if V::WIRE_TYPE == WireType::StartGroup {
            self.write_tag(tag.end_group())?;
        }
        Ok(())
    }

    /// Writes a collection of values to the output.
    #[inline]
    pub fn write_values<V: Value, T: RepeatedValue<V>>(&mut self, value: &T, tag: Tag) -> Result {
        value.write_to(self, tag)
    }

    /// Writes a collection of fields to the output.
    #[inline]
    pub fn write_fields<T: FieldSet>(&mut self, value: &T) -> Result {
        value.write_to(self)
    }
}
