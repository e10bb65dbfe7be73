//! Shared primitives for encoding and decoding fixed-schema message
//! bodies: big-endian integers and raw 16-byte UUIDs.

use byteorder::{BigEndian, ByteOrder};

use bcagent_error::{Error, Result};

use crate::ids::Uuid;

pub(crate) fn push_u32(buf: &mut Vec<u8>, v: u32) {
    let mut b = [0u8; 4];
    BigEndian::write_u32(&mut b, v);
    buf.extend_from_slice(&b);
}

pub(crate) fn push_u64(buf: &mut Vec<u8>, v: u64) {
    let mut b = [0u8; 8];
    BigEndian::write_u64(&mut b, v);
    buf.extend_from_slice(&b);
}

pub(crate) fn push_uuid(buf: &mut Vec<u8>, v: &Uuid) {
    buf.extend_from_slice(v);
}

/// A cursor over a decode buffer that yields *unexpected-payload-size*
/// the moment a read would run past the end, rather than panicking.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.buf.len() - self.pos < len {
            return Err(Error::UnexpectedPayloadSize(format!(
                "expected at least {} more bytes, found {}",
                len,
                self.buf.len() - self.pos
            )));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    pub(crate) fn read_uuid(&mut self) -> Result<Uuid> {
        let mut uuid = [0u8; 16];
        uuid.copy_from_slice(self.take(16)?);
        Ok(uuid)
    }

    /// Everything from the current position to the end of the buffer.
    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let slice = &self.buf[self.pos..];
        self.pos = self.buf.len();
        slice
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Current byte offset into the underlying buffer.
    pub(crate) fn remaining_offset(&self) -> usize {
        self.pos
    }

    /// Advance the cursor by `len` bytes without returning them.
    pub(crate) fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len)?;
        Ok(())
    }

    pub(crate) fn take_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }
}

/// Read an explicitly-sized tail field and require it to be the last
/// thing in the buffer -- a mismatch between the declared size and the
/// bytes actually available is an *unexpected-payload-size* error
/// rather than silently accepting trailing garbage.
pub(crate) fn read_sized_tail(r: &mut Reader, size: usize) -> Result<Vec<u8>> {
    let bytes = r.take_vec(size)?;
    if r.remaining() != 0 {
        return Err(Error::UnexpectedPayloadSize(format!(
            "{} trailing bytes after the declared tail size",
            r.remaining()
        )));
    }
    Ok(bytes)
}
