//! Defines the `CodedReader`, a reader for reading values from a protobuf encoded byte stream.

use std::convert::TryFrom;
use std::io::{self, BufRead, BufReader, Read};
use std::mem;
use std::result;
use std::string::FromUtf8Error;
use crate::collections::{RepeatedValue, FieldSet, TryRead};
use crate::io::{Tag, WireType, Length};
use crate::raw::Value;
use either::{Either, Left, Right};
use thiserror::Error;

/// The error type for [`CodedReader`](struct.CodedReader.html)
#[derive(Debug, Error)]
pub enum Error {
    /// The input contained a malformed variable length integer
    #[error("the input contained an invalid variable length integer")]
    MalformedVarint,
    /// The input contained a length delimited value which reported it had a negative size
    #[error("the input contained a length delimited value which reported it had a negative size")]
    NegativeSize,
    /// The input contained an invalid tag (zero or the tag had an invalid wire format)
    #[error("the input contained a tag that was either invalid or was unexpected at this point in the input: {0}")]
    InvalidTag(u32),
    /// A group was not closed by the end tag matching its start tag
    #[error("the input contained a group that was not closed by its end tag")]
    MissingEndGroup,
    /// The input nested messages or groups deeper than the reader's recursion limit
    #[error("the input nested messages or groups deeper than the recursion limit")]
    RecursionLimitExceeded,
    /// An error occured while reading from the underlying `Read` object
    #[error("an error occured in the underlying input")]
    IoError(#[from] io::Error),
    /// The input contained an invalid UTF8 string
    #[error("the input contained an invalid UTF8 string")]
    InvalidString(#[from] FromUtf8Error),
}

/// A result for a [`CodedReader`](struct.CodedReader.html) read operation
pub type Result<T> = result::Result<T, Error>;

/// The number of nested messages and groups a reader allows by default
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// A set of options that can be used to modify the behavior of [`CodedReader`](struct.CodedReader.html)
#[derive(Copy, Clone, Debug)]
pub struct ReaderOptions {
    /// Indicates if unknown field sets should skip reading fields
    pub skip_unknown_fields: bool,
    /// The maximum number of messages and groups that can be nested in the input
    pub recursion_limit: u32,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            skip_unknown_fields: false,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

/// A builder used to construct [`CodedReader`](struct.CodedReader.html) instances
#[derive(Clone, Debug, Default)]
pub struct Builder {
    options: ReaderOptions
}

impl Builder {
    /// Creates a new builder with the default configuration
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }
    /// Sets whether unknown field sets should skip unknown fields
    #[inline]
    pub fn skip_unknown_fields(mut self, value: bool) -> Self {
        self.options.skip_unknown_fields = value;
        self
    }
    /// Sets the maximum number of messages and groups that can be nested in the input
    #[inline]
    pub fn recursion_limit(mut self, value: u32) -> Self {
        self.options.recursion_limit = value;
        self
    }
    /// Constructs a [`CodedReader`](struct.CodedReader.html) using this builder and
    /// the specified slice of bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use protext::io::ReaderBuilder;
    ///
    /// let data = [8, 15];
    /// let reader =
    ///     ReaderBuilder::new()
    ///         .skip_unknown_fields(true)
    ///         .with_slice(&data);
    ///
    /// assert!(reader.skip_unknown_fields());
    /// ```
    #[inline]
    pub fn with_slice<'a>(&self, inner: &'a [u8]) -> CodedReader<'a> {
        CodedReader::with_slice(inner).with_options(self.options)
    }
    /// Constructs a [`CodedReader`](struct.CodedReader.html) using this builder and
    /// the specified [`Read`](https://doc.rust-lang.org/std/io/trait.Read.html) object
    #[inline]
    pub fn with_read<'a>(&self, inner: &'a mut dyn Read) -> CodedReader<'a> {
        CodedReader::with_read(inner).with_options(self.options)
    }
}

/// The state a reader returns to after a pushed length or a group has been read.
///
/// This is returned by [`push_length`], [`enter_message`] and [`enter_group`] and must be handed back
/// to [`pop_length`] or [`exit_group`] respectively.
///
/// [`push_length`]: struct.CodedReader.html#method.push_length
/// [`enter_message`]: struct.CodedReader.html#method.enter_message
/// [`enter_group`]: struct.CodedReader.html#method.enter_group
/// [`pop_length`]: struct.CodedReader.html#method.pop_length
/// [`exit_group`]: struct.CodedReader.html#method.exit_group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the previous reader state must be restored once the value has been read"]
pub struct Scope {
    limit: Option<i32>,
    group_end: Option<Tag>,
    depth: u32,
}

/// A coded input reader that reads from a borrowed [`Read`] or a slice of bytes.
///
/// [`Read`]: https://doc.rust-lang.org/std/io/trait.Read.html
pub struct CodedReader<'a> {
    inner: Either<BufReader<&'a mut dyn Read>, &'a [u8]>,
    limit: Option<i32>,
    group_end: Option<Tag>,
    last_tag: Option<Tag>,
    depth: u32,
    options: ReaderOptions,
}

impl<'a> CodedReader<'a> {
    /// Creates a new [`CodedReader`] over the borrowed [`Read`].
    ///
    /// [`CodedReader`]: struct.CodedReader.html
    /// [`Read`]: https://doc.rust-lang.org/std/io/trait.Read.html
    #[inline]
    pub fn with_read(inner: &'a mut dyn Read) -> Self {
        Self::new(Left(BufReader::new(inner)))
    }
    /// Creates a new [`CodedReader`] over the borrowed [`Read`] with a specified inner buffer capacity.
    ///
    /// [`CodedReader`]: struct.CodedReader.html
    /// [`Read`]: https://doc.rust-lang.org/std/io/trait.Read.html
    #[inline]
    pub fn with_capacity(cap: usize, inner: &'a mut dyn Read) -> Self {
        Self::new(Left(BufReader::with_capacity(cap, inner)))
    }
    /// Creates a new [`CodedReader`] over the borrowed slice.
    /// This reads directly from the slice, making it faster than reading from a buffered [`Read`] object.
    ///
    /// [`CodedReader`]: struct.CodedReader.html
    /// [`Read`]: https://doc.rust-lang.org/std/io/trait.Read.html
    #[inline]
    pub fn with_slice(inner: &'a [u8]) -> Self {
        Self::new(Right(inner))
    }

    fn new(inner: Either<BufReader<&'a mut dyn Read>, &'a [u8]>) -> Self {
        Self {
            inner,
            limit: None,
            group_end: None,
            last_tag: None,
            depth: 0,
            options: Default::default(),
        }
    }

    /// Sets options in use by the reader
    #[inline]
    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    fn eof() -> Error {
        io::Error::from(io::ErrorKind::UnexpectedEof).into()
    }

    fn consume_limit(&mut self, amnt: usize) -> Result<()> {
        if let Some(limit) = self.limit {
            match i32::try_from(amnt) {
                Ok(amnt) if amnt <= limit => self.limit = Some(limit - amnt),
                _ => return Err(Self::eof()),
            }
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.consume_limit(buf.len())?;
        match &mut self.inner {
            Left(read) => read.read_exact(buf)?,
            Right(slice) => {
                if slice.len() < buf.len() {
                    return Err(Self::eof());
                }
                let rest: &'a [u8] = *slice;
                let (head, tail) = rest.split_at(buf.len());
                buf.copy_from_slice(head);
                *slice = tail;
            }
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn is_at_end(&mut self) -> Result<bool> {
        if self.reached_limit() {
            return Ok(true);
        }
        match &mut self.inner {
            Left(read) => Ok(read.fill_buf()?.is_empty()),
            Right(slice) => Ok(slice.is_empty()),
        }
    }

    /// Returns if unknown field sets should skip any unknown fields when merging
    #[inline]
    pub fn skip_unknown_fields(&self) -> bool {
        self.options.skip_unknown_fields
    }

    /// Returns the maximum number of messages and groups that can be nested in the input
    #[inline]
    pub fn recursion_limit(&self) -> u32 {
        self.options.recursion_limit
    }

    /// Returns the number of messages and groups the reader is currently inside of
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn descend(&mut self) -> Result<u32> {
        if self.depth >= self.options.recursion_limit {
            return Err(Error::RecursionLimitExceeded);
        }
        let old = self.depth;
        self.depth += 1;
        Ok(old)
    }

    /// Gets the last tag read from the input.
    #[inline]
    pub fn last_tag(&self) -> Option<Tag> {
        self.last_tag
    }

    /// Reads a length delimited value's length from the input.
    /// This returns [`Error::NegativeSize`](enum.Error.html#variant.NegativeSize) if the length is invalid.
    #[inline]
    pub fn read_length(&mut self) -> Result<Length> {
        let value = self.read_varint32()? as i32;
        Length::new(value).ok_or(Error::NegativeSize)
    }

    /// Reads a length from the input and pushes it, returning the state to restore when the input has reached its limit.
    /// If an error occurs while reading the length, this does not push a length.
    #[inline]
    pub fn read_and_push_length(&mut self) -> Result<Scope> {
        let length = self.read_length()?;
        self.push_length(length)
    }

    /// Pushes a new length to the reader, limiting the amount of data read from the input by the
    /// specified amount.
    ///
    /// This fails if the length goes past the end of the current limit. Any group the reader is in
    /// is suspended until the length is popped.
    #[inline]
    pub fn push_length(&mut self, length: Length) -> Result<Scope> {
        let remaining = match self.limit {
            Some(limit) if length.get() > limit => return Err(Self::eof()),
            Some(limit) => Some(limit - length.get()),
            None => None,
        };
        let scope = Scope {
            limit: remaining,
            group_end: self.group_end.take(),
            depth: self.depth,
        };
        self.limit = Some(length.get());
        Ok(scope)
    }

    /// Reads the length of an embedded message and pushes it, counting the message against the
    /// reader's recursion limit until the returned state is popped.
    ///
    /// This fails with [`Error::RecursionLimitExceeded`](enum.Error.html#variant.RecursionLimitExceeded)
    /// if the reader is already nested as deep as its limit allows.
    #[inline]
    pub fn enter_message(&mut self) -> Result<Scope> {
        let depth = self.descend()?;
        let length = match self.read_length() {
            Ok(length) => length,
            Err(e) => {
                self.depth = depth;
                return Err(e);
            }
        };
        match self.push_length(length) {
            Ok(scope) => Ok(Scope { depth, ..scope }),
            Err(e) => {
                self.depth = depth;
                Err(e)
            }
        }
    }

    /// Returns the reader to the state it was in before a length was pushed.
    ///
    /// This should only be used after the current length has been read to completion. Using this
    /// before doing so leaves the remaining bytes unaccounted for in any outer length.
    #[inline]
    pub fn pop_length(&mut self, old: Scope) {
        self.limit = old.limit;
        self.group_end = old.group_end;
        self.depth = old.depth;
    }

    /// Returns if the length's limit has been reached. This is always false if no length has been pushed.
    #[inline]
    pub fn reached_limit(&self) -> bool {
        self.limit == Some(0)
    }

    /// Starts reading a group closed by the specified end tag. Until the end tag is read,
    /// [`read_tag`](#method.read_tag) returns `None` when it reaches that tag.
    ///
    /// This fails with [`Error::RecursionLimitExceeded`](enum.Error.html#variant.RecursionLimitExceeded)
    /// if the reader is already nested as deep as its limit allows.
    #[inline]
    pub fn enter_group(&mut self, end: Tag) -> Result<Scope> {
        let depth = self.descend()?;
        Ok(Scope {
            limit: self.limit,
            group_end: mem::replace(&mut self.group_end, Some(end)),
            depth,
        })
    }

    /// Finishes reading a group, checking that the group's end tag was the last tag read.
    #[inline]
    pub fn exit_group(&mut self, old: Scope) -> Result<()> {
        let end = self.group_end;
        self.group_end = old.group_end;
        self.depth = old.depth;
        if end.is_some() && self.last_tag == end {
            Ok(())
        } else {
            Err(Error::MissingEndGroup)
        }
    }

    /// Reads a tag from the input, returning none if there is no more data available in the input,
    /// the current length has been reached, or the end tag of the current group was read.
    #[inline]
    pub fn read_tag(&mut self) -> Result<Option<Tag>> {
        if self.is_at_end()? {
            self.last_tag = None;
            return Ok(None);
        }

        let value = self.read_varint32()?;
        let tag = Tag::try_from(value).map_err(|_| Error::InvalidTag(value))?;
        self.last_tag = Some(tag);

        if tag.wire_type() == WireType::EndGroup {
            if self.group_end == Some(tag) {
                Ok(None)
            } else {
                Err(Error::InvalidTag(value))
            }
        } else {
            Ok(Some(tag))
        }
    }

    /// Reads a 32-bit varint from the input. This is optimized for 32-bit varint values and will discard
    /// the top 32 bits of a 64-bit varint value.
    #[inline]
    pub fn read_varint32(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for i in 0..5 {
            let b = self.read_byte()? as u32;
            value |= (b & 0x7F) << (7 * i);
            if b < 0x80 {
                return Ok(value);
            }
        }
        for _ in 0..5 {
            if self.read_byte()? < 0x80 {
                return Ok(value);
            }
        }
        Err(Error::MalformedVarint)
    }

    /// Reads a 64-bit varint from the input.
    #[inline]
    pub fn read_varint64(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..10 {
            let b = self.read_byte()? as u64;
            value |= (b & 0x7F) << (7 * i);
            if b < 0x80 {
                return Ok(value);
            }
        }
        Err(Error::MalformedVarint)
    }

    /// Reads a 32-bit little endian value from the input
    #[inline]
    pub fn read_bit32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a 64-bit little endian value from the input
    #[inline]
    pub fn read_bit64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a length delimited value from the input prefixed by a length
    #[inline]
    pub fn read_length_delimited(&mut self) -> Result<Vec<u8>> {
        let length = self.read_length()?.get();
        let too_long = match (&self.inner, self.limit) {
            (_, Some(limit)) if length > limit => true,
            (Right(slice), _) => length as usize > slice.len(),
            _ => false,
        };
        if too_long {
            return Err(Self::eof());
        }

        let mut data = vec![0; length as usize];
        self.read_exact(&mut data)?;
        Ok(data)
    }

    /// Skips the last value based on the tag read from the input. If no tag has been read, this does nothing
    pub fn skip(&mut self) -> Result<()> {
        if let Some(tag) = self.last_tag {
            match tag.wire_type() {
                WireType::Varint => { self.read_varint64()?; },
                WireType::Bit64 => { self.read_bit64()?; },
                WireType::LengthDelimited => {
                    let length = self.read_length()?;
                    self.skip_bytes(length)?;
                },
                WireType::StartGroup => {
                    let old = self.enter_group(tag.end_group())?;
                    while self.read_tag()?.is_some() {
                        self.skip()?;
                    }
                    self.exit_group(old)?;
                },
                WireType::EndGroup => { },
                WireType::Bit32 => { self.read_bit32()?; }
            }
        }
        Ok(())
    }

    fn skip_bytes(&mut self, length: Length) -> Result<()> {
        let length = length.get() as usize;
        self.consume_limit(length)?;
        match &mut self.inner {
            Left(read) => {
                let copied = io::copy(&mut read.by_ref().take(length as u64), &mut io::sink())?;
                if copied as usize != length {
                    return Err(Self::eof());
                }
            },
            Right(slice) => {
                if slice.len() < length {
                    return Err(Self::eof());
                }
                let rest: &'a [u8] = *slice;
                *slice = &rest[length..];
            }
        }
        Ok(())
    }

    /// Reads a new instance of the value from the input
    #[inline]
    pub fn read_value<V: Value>(&mut self) -> Result<V::Inner> {
        V::read_new(self)
    }

    /// Merges an existing instance of a value with a value from the input
    #[inline]
    pub fn merge_value<V: Value>(&mut self, value: &mut V::Inner) -> Result<()> {
        V::merge_from(self, value)
    }

    /// Adds values from the input to the repeated value
    #[inline]
    pub fn add_entries_to<V: Value, T: RepeatedValue<V>>(&mut self, value: &mut T) -> Result<()> {
        value.add_entries_from(self)
    }

    /// Tries to add the field to the set, possibly adding the field or yielding control to another set
    #[inline]
    pub fn try_add_field_to<'b, T: FieldSet>(&'b mut self, value: &mut T) -> Result<TryRead<'b, 'a>> {
        value.try_add_field_from(self)
    }
}
