//! Sequential reader over an in-memory `.dat` buffer.
//!
//! Every multi-byte scalar in the format is stored byte-reversed relative to
//! little-endian, so all reads here are big-endian. There is no per-call
//! byte-order choice.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};
use half::f16;

use crate::error::{Error, Result};

/// Read-only cursor with an explicit position.
///
/// Reads are bounds-checked before they touch the buffer, so a short buffer
/// always surfaces as [`Error::OutOfData`] with the failing offset.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    /// The full underlying buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        *self.inner.get_ref()
    }

    /// Current absolute position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    /// Total buffer length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Bytes left between the position and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    /// Move to an absolute offset. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.len() {
            return Err(Error::OutOfData {
                offset,
                needed: 0,
                available: 0,
            });
        }
        self.inner.set_position(offset as u64);
        Ok(())
    }

    /// Advance past `count` bytes without interpreting them.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.ensure(count)?;
        self.inner.set_position((self.position() + count) as u64);
        Ok(())
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let available = self.remaining();
        if needed > available {
            return Err(Error::OutOfData {
                offset: self.position(),
                needed,
                available,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Integers
    // ------------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.inner.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        Ok(self.inner.read_i8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.inner.read_u16::<BigEndian>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        Ok(self.inner.read_i16::<BigEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.inner.read_u32::<BigEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.inner.read_i32::<BigEndian>()?)
    }

    /// Read a u32 at an absolute offset without moving the cursor.
    #[must_use]
    pub fn peek_u32_at(&self, offset: usize) -> Option<u32> {
        let bytes = self.data().get(offset..offset.checked_add(4)?)?;
        Some(u32::from_be_bytes(bytes.try_into().ok()?))
    }

    // ------------------------------------------------------------------
    // Floats
    // ------------------------------------------------------------------

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.inner.read_f32::<BigEndian>()?)
    }

    /// Read a half-precision float and widen it.
    pub fn read_f16(&mut self) -> Result<f32> {
        Ok(f16::from_bits(self.read_u16()?).to_f32())
    }

    /// Read `N` consecutive f32 values.
    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        self.ensure(N * 4)?;
        let mut out = [0.0f32; N];
        self.inner.read_f32_into::<BigEndian>(&mut out)?;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Bytes and strings
    // ------------------------------------------------------------------

    /// Borrow the next `count` bytes and advance past them.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.ensure(count)?;
        let start = self.position();
        let data: &'a [u8] = self.data();
        self.inner.set_position((start + count) as u64);
        Ok(&data[start..start + count])
    }

    /// Read a null-terminated UTF-8 string. The terminator is consumed.
    ///
    /// An exhausted buffer is `OutOfData`; a string that starts but never
    /// terminates is `UnterminatedString`.
    pub fn read_cstring(&mut self) -> Result<String> {
        self.ensure(1)?;
        let start = self.position();
        let tail = &self.data()[start..];
        let Some(len) = tail.iter().position(|&b| b == 0) else {
            return Err(Error::UnterminatedString { offset: start });
        };
        let text = std::str::from_utf8(&tail[..len])
            .map_err(|_| Error::InvalidEncoding { offset: start })?
            .to_string();
        self.inner.set_position((start + len + 1) as u64);
        Ok(text)
    }

    /// Read a fixed-length UTF-8 string field.
    ///
    /// The whole field is decoded; only trailing NUL padding is dropped.
    pub fn read_fixed_string(&mut self, length: usize) -> Result<String> {
        let start = self.position();
        let bytes = self.read_bytes(length)?;
        let text = std::str::from_utf8(bytes).map_err(|_| Error::InvalidEncoding { offset: start })?;
        Ok(text.trim_end_matches('\0').to_string())
    }
}
