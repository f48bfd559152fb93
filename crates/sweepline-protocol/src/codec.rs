//! Typed reader/writer over raw frame bytes.
//!
//! Every wire layout in Sweepline passes through [`Reader`] (inbound) or
//! [`Writer`] (outbound). Both keep a cursor that advances by exactly the
//! width of each field. Integers are fixed-width big-endian; strings are a
//! big-endian `u16` byte-length prefix followed by that many UTF-8 bytes.
//!
//! Types that have a fixed wire layout implement [`Wire`], so composite
//! messages can be read and written field by field without repeating the
//! layout in two places.

use crate::ProtocolError;

/// Width of a `u16` string length prefix.
const STRING_PREFIX: usize = 2;

// ---------------------------------------------------------------------------
// Wire trait
// ---------------------------------------------------------------------------

/// A value with a fixed, self-describing wire layout.
///
/// `wire_len` must equal the number of bytes `write` produces. Outbound
/// buffers are sized from it up front and never grow.
pub trait Wire: Sized {
    /// Reads one value, advancing the reader past it.
    fn read(reader: &mut Reader<'_>) -> Result<Self, ProtocolError>;

    /// Writes this value, advancing the writer past it.
    fn write(&self, writer: &mut Writer) -> Result<(), ProtocolError>;

    /// Number of bytes `write` will produce.
    fn wire_len(&self) -> usize;
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over an immutable inbound frame.
///
/// Every read either consumes exactly its field width or fails with
/// [`ProtocolError::BufferExhausted`]. A failed read leaves the cursor
/// where it was, but callers are expected to abandon the frame.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at offset 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        if self.remaining() < n {
            return Err(ProtocolError::BufferExhausted {
                offset: self.pos,
                needed: n,
                len: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// One raw byte.
    pub fn byte(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    /// One byte; any non-zero value is `true`.
    pub fn bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.byte()? != 0)
    }

    /// Four bytes, big-endian signed.
    pub fn i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    /// Eight bytes, big-endian signed. Used for millisecond timestamps.
    pub fn i64(&mut self) -> Result<i64, ProtocolError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    /// Four bytes, big-endian IEEE 754.
    pub fn f32(&mut self) -> Result<f32, ProtocolError> {
        Ok(f32::from_be_bytes(self.array()?))
    }

    /// A `u16` byte-length prefix followed by UTF-8 bytes.
    pub fn string(&mut self) -> Result<String, ProtocolError> {
        let len = u16::from_be_bytes(self.array()?) as usize;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ProtocolError::InvalidUtf8 { offset })
    }

    /// `len` raw bytes, no prefix.
    pub fn bytes(&mut self, len: usize) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.take(len)?.to_vec())
    }

    /// Four bytes per element for `len` elements, big-endian, no count prefix.
    pub fn i32_array(&mut self, len: usize) -> Result<Vec<i32>, ProtocolError> {
        let needed = len.checked_mul(4).ok_or(ProtocolError::BufferExhausted {
            offset: self.pos,
            needed: usize::MAX,
            len: self.buf.len(),
        })?;
        let raw = self.take(needed)?;
        Ok(raw
            .chunks_exact(4)
            .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Reads a [`Wire`] value.
    pub fn read<T: Wire>(&mut self) -> Result<T, ProtocolError> {
        T::read(self)
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Cursor over a pre-sized outbound buffer.
///
/// The buffer is allocated once with the exact frame length. Writing past
/// the end fails with [`ProtocolError::BufferOverflow`], and
/// [`finish`](Self::finish) refuses to hand back a buffer that still has
/// unwritten bytes.
#[derive(Debug)]
pub struct Writer {
    buf: Vec<u8>,
    pos: usize,
}

impl Writer {
    /// Creates a zero-filled buffer of exactly `len` bytes.
    pub fn with_len(len: usize) -> Self {
        Self {
            buf: vec![0; len],
            pos: 0,
        }
    }

    /// Wire width of `s` including its length prefix.
    pub fn string_len(s: &str) -> usize {
        STRING_PREFIX + s.len()
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(ProtocolError::BufferOverflow {
                offset: self.pos,
                needed: bytes.len(),
                len: self.buf.len(),
            });
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// One raw byte.
    pub fn byte(&mut self, value: u8) -> Result<(), ProtocolError> {
        self.put(&[value])
    }

    /// One byte, `1` or `0`.
    pub fn bool(&mut self, value: bool) -> Result<(), ProtocolError> {
        self.byte(u8::from(value))
    }

    /// Four bytes, big-endian signed.
    pub fn i32(&mut self, value: i32) -> Result<(), ProtocolError> {
        self.put(&value.to_be_bytes())
    }

    /// Eight bytes, big-endian signed.
    pub fn i64(&mut self, value: i64) -> Result<(), ProtocolError> {
        self.put(&value.to_be_bytes())
    }

    /// Four bytes, big-endian IEEE 754.
    pub fn f32(&mut self, value: f32) -> Result<(), ProtocolError> {
        self.put(&value.to_be_bytes())
    }

    /// Writes the UTF-8 byte length (not the char count) as the prefix.
    pub fn string(&mut self, value: &str) -> Result<(), ProtocolError> {
        let len = u16::try_from(value.len())
            .map_err(|_| ProtocolError::StringTooLong(value.len()))?;
        self.put(&len.to_be_bytes())?;
        self.put(value.as_bytes())
    }

    /// `value.len()` raw bytes, no prefix.
    pub fn bytes(&mut self, value: &[u8]) -> Result<(), ProtocolError> {
        self.put(value)
    }

    /// Four bytes per element, big-endian, no count prefix.
    pub fn i32_array(&mut self, values: &[i32]) -> Result<(), ProtocolError> {
        values.iter().try_for_each(|v| self.i32(*v))
    }

    /// Writes a [`Wire`] value.
    pub fn write<T: Wire>(&mut self, value: &T) -> Result<(), ProtocolError> {
        value.write(self)
    }

    /// Returns the buffer once every byte has been written.
    pub fn finish(self) -> Result<Vec<u8>, ProtocolError> {
        if self.pos != self.buf.len() {
            return Err(ProtocolError::BufferUnderfilled {
                written: self.pos,
                len: self.buf.len(),
            });
        }
        Ok(self.buf)
    }
}
