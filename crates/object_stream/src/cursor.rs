use byteorder::{BigEndian, ByteOrder};

use crate::{ObjectStreamError, Result};

type Endian = BigEndian;

/// Sequential big-endian reader over a borrowed byte slice.
///
/// A failed read leaves the position where it was.
pub struct BinaryCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BinaryCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn peek_byte(&self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf[self.pos])
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(Endian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(Endian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(Endian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(Endian::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(Endian::read_u64(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(Endian::read_i64(self.take(8)?))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Reads `n` bytes as a narrow string, one character per byte.
    pub fn read_modified_utf8(&mut self, n: usize) -> Result<String> {
        Ok(self.take(n)?.iter().map(|&b| b as char).collect())
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(ObjectStreamError::OutOfRange {
                offset: self.pos,
                requested: n,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }
}
