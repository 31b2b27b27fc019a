//! Primitive binary codec: a forward-only reader, an append-only writer and
//! the `Encodable` / `Decodable` traits every wire type implements.
//!
//! All integers are little-endian. Variable-length integers use a marker
//! byte to select the width:
//!
//! ```text
//! value < 0xfd          -> [value]
//! value <= 0xffff       -> [0xfd, u16 le]
//! value <= 0xffff_ffff  -> [0xfe, u32 le]
//! otherwise             -> [0xff, u64 le]
//! ```

use crate::config::CodecLimits;
use crate::error::{DecodeError, Result};

/// A value with a canonical binary encoding.
pub trait Encodable {
    /// Exact number of bytes `encode` will write, computed without writing.
    fn size(&self) -> usize;

    /// Append the encoding to the writer.
    fn encode(&self, writer: &mut BinaryWriter<'_>);
}

/// A value that can be read back from its canonical binary encoding.
pub trait Decodable: Sized {
    fn decode(reader: &mut BinaryReader<'_>) -> Result<Self>;
}

impl<T: Encodable + ?Sized> Encodable for &T {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn encode(&self, writer: &mut BinaryWriter<'_>) {
        (**self).encode(writer)
    }
}

// =========================================================================
// Size helpers
// =========================================================================

/// Encoded width of a variable-length integer.
pub fn var_int_size(value: u64) -> usize {
    if value < 0xfd {
        1
    } else if value <= 0xffff {
        3
    } else if value <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Encoded width of a length-prefixed byte block of `len` bytes.
pub fn var_bytes_size(len: usize) -> usize {
    var_int_size(len as u64) + len
}

/// Encoded width of a count-prefixed array.
pub fn array_size<T: Encodable>(items: &[T]) -> usize {
    var_int_size(items.len() as u64) + items.iter().map(Encodable::size).sum::<usize>()
}

// =========================================================================
// Reader
// =========================================================================

/// Forward-only cursor over a borrowed byte slice.
///
/// Every read either advances past exactly the bytes it consumed or fails
/// without a partial result. There is no backtracking: callers that want to
/// retry after `InsufficientData` should remember `position()` and start a
/// new reader over the extended buffer.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
    limits: CodecLimits,
}

impl<'a> BinaryReader<'a> {
    /// Create a reader with the default size limits.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, CodecLimits::default())
    }

    /// Create a reader with custom size limits.
    pub fn with_limits(data: &'a [u8], limits: CodecLimits) -> Self {
        Self {
            data,
            pos: 0,
            limits,
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(DecodeError::InsufficientData {
                needed: n,
                remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes into an array.
    pub fn read_array_exact<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a boolean encoded as a single `0` or `1` byte.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::malformed(
                "bool",
                format!("expected 0 or 1, got {other:#04x}"),
            )),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array_exact()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array_exact()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array_exact()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array_exact()?))
    }

    /// Read exactly `count` bytes as an owned copy.
    pub fn read_fixed_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        Ok(self.take(count)?.to_vec())
    }

    /// Read a variable-length integer.
    ///
    /// Non-minimal encodings (e.g. `0xfd 0x01 0x00`) are rejected so that
    /// every accepted encoding re-encodes to the same bytes.
    pub fn read_var_int(&mut self) -> Result<u64> {
        let marker = self.read_u8()?;
        let (value, min) = match marker {
            0xfd => (u64::from(self.read_u16()?), 0xfd),
            0xfe => (u64::from(self.read_u32()?), 0x1_0000),
            0xff => (self.read_u64()?, 0x1_0000_0000),
            small => return Ok(u64::from(small)),
        };
        if value < min {
            return Err(DecodeError::malformed(
                "var int",
                format!("non-minimal encoding of {value} with marker {marker:#04x}"),
            ));
        }
        Ok(value)
    }

    /// Read a variable-length integer and reject values above `max`.
    pub fn read_var_int_max(&mut self, max: u64) -> Result<u64> {
        let value = self.read_var_int()?;
        if value > max {
            return Err(DecodeError::SizeLimitExceeded {
                field: "var int",
                len: value,
                max,
            });
        }
        Ok(value)
    }

    /// Read a length-prefixed byte block bounded by the reader's limit.
    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>> {
        self.read_var_bytes_max(self.limits.max_var_bytes)
    }

    /// Read a length-prefixed byte block of at most `max` bytes.
    ///
    /// The length is checked before any allocation happens.
    pub fn read_var_bytes_max(&mut self, max: usize) -> Result<Vec<u8>> {
        let max = max.min(self.limits.max_var_bytes) as u64;
        let len = self.read_var_int()?;
        if len > max {
            return Err(DecodeError::SizeLimitExceeded {
                field: "var bytes",
                len,
                max,
            });
        }
        self.read_fixed_bytes(len as usize)
    }

    /// Read a length-prefixed UTF-8 string of at most `max` bytes.
    ///
    /// Invalid UTF-8 is rejected rather than replaced, so the decoded string
    /// always re-encodes to the original bytes.
    pub fn read_var_string_max(&mut self, max: usize) -> Result<String> {
        let bytes = self.read_var_bytes_max(max)?;
        String::from_utf8(bytes).map_err(|e| DecodeError::malformed("string", e.to_string()))
    }

    /// Read a count-prefixed array bounded by the reader's limit.
    pub fn read_array<T: Decodable>(&mut self) -> Result<Vec<T>> {
        self.read_array_max(self.limits.max_array_len)
    }

    /// Read a count-prefixed array of at most `max` items.
    pub fn read_array_max<T: Decodable>(&mut self, max: usize) -> Result<Vec<T>> {
        self.read_array_with(max, T::decode)
    }

    /// Read a count-prefixed array using a custom item decoder.
    ///
    /// Fails on the first item that fails; items decoded before it are
    /// dropped.
    pub fn read_array_with<T, F>(&mut self, max: usize, mut decode_item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let max = max.min(self.limits.max_array_len) as u64;
        let count = self.read_var_int()?;
        if count > max {
            return Err(DecodeError::SizeLimitExceeded {
                field: "array",
                len: count,
                max,
            });
        }
        // Every item takes at least one byte, so never reserve more than that.
        let count = count as usize;
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(decode_item(self)?);
        }
        Ok(items)
    }

    /// Decode any `Decodable` value.
    pub fn read<T: Decodable>(&mut self) -> Result<T> {
        T::decode(self)
    }
}

// =========================================================================
// Writer
// =========================================================================

/// Append-only writer over a caller-owned buffer.
///
/// Writing into a `Vec` cannot fail, so none of these methods return errors.
#[derive(Debug)]
pub struct BinaryWriter<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> BinaryWriter<'a> {
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        Self { buf }
    }

    /// Number of bytes in the underlying buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write raw bytes with no length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_var_int(&mut self, value: u64) {
        if value < 0xfd {
            self.write_u8(value as u8);
        } else if value <= 0xffff {
            self.write_u8(0xfd);
            self.write_u16(value as u16);
        } else if value <= 0xffff_ffff {
            self.write_u8(0xfe);
            self.write_u32(value as u32);
        } else {
            self.write_u8(0xff);
            self.write_u64(value);
        }
    }

    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_var_int(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    pub fn write_var_string(&mut self, value: &str) {
        self.write_var_bytes(value.as_bytes());
    }

    pub fn write<T: Encodable + ?Sized>(&mut self, value: &T) {
        value.encode(self);
    }

    pub fn write_array<T: Encodable>(&mut self, items: &[T]) {
        self.write_var_int(items.len() as u64);
        for item in items {
            item.encode(self);
        }
    }
}

// =========================================================================
// Entry points
// =========================================================================

/// Append the encoding of `value` to a reusable scratch buffer.
///
/// # Panics
///
/// Panics if `value.size()` disagrees with the number of bytes written,
/// which indicates a bug in that type's `Encodable` impl.
pub fn encode_into<T: Encodable + ?Sized>(value: &T, scratch: &mut Vec<u8>) {
    let expected = value.size();
    let start = scratch.len();
    scratch.reserve(expected);
    value.encode(&mut BinaryWriter::new(scratch));
    let written = scratch.len() - start;
    assert_eq!(
        written, expected,
        "encoded size {written} does not match size estimate {expected}"
    );
}

/// Encode `value` into a freshly allocated buffer of exactly `size()` bytes.
pub fn to_bytes<T: Encodable + ?Sized>(value: &T) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf);
    buf
}

/// Decode a complete value, rejecting trailing bytes.
pub fn from_bytes<T: Decodable>(bytes: &[u8]) -> Result<T> {
    from_bytes_with_limits(bytes, CodecLimits::default())
}

/// Decode a complete value under custom limits, rejecting trailing bytes.
pub fn from_bytes_with_limits<T: Decodable>(bytes: &[u8], limits: CodecLimits) -> Result<T> {
    let mut reader = BinaryReader::with_limits(bytes, limits);
    let value = T::decode(&mut reader)?;
    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes {
            count: reader.remaining(),
        });
    }
    Ok(value)
}
