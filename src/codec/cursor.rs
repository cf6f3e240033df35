//! In-memory cursor with an append-only writer and a forward-only reader.
//!
//! Fixed-width integers are little-endian. Writes append past the end of the
//! storage and never move the read offset; decodes consume from the offset
//! forward and leave it untouched when they fail.

use std::io;

use bytes::{BufMut, BytesMut};

use crate::codec::varint::{self, MAX_VARINT_LEN};
use crate::error::{Error, Result};

/// Growable byte storage with a single read offset.
///
/// [`reset`](Self::reset) empties the cursor but keeps its allocation, which
/// is what lets a [`CursorPool`](crate::pool::CursorPool) recycle it.
#[derive(Debug, Clone, Default)]
pub struct BufferCursor {
    buf: BytesMut,
    offset: usize,
}

impl BufferCursor {
    /// Create an empty cursor without allocating.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cursor with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            offset: 0,
        }
    }

    /// Wrap existing bytes; reading starts at the front.
    pub fn from_bytes(buf: BytesMut) -> Self {
        Self { buf, offset: 0 }
    }

    /// Unread bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len() - self.offset
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Backing capacity of the storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Current read offset from the start of the storage.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move the read offset anywhere within the written bytes.
    pub fn set_offset(&mut self, offset: usize) -> Result<()> {
        if offset > self.buf.len() {
            return Err(Error::OffsetOutOfRange {
                offset,
                len: self.buf.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    /// Skip `n` unread bytes.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.offset += n;
        Ok(())
    }

    /// Unread bytes as a slice.
    #[inline]
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.offset..]
    }

    /// Every written byte, including those already read.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Give up the storage, discarding the offset.
    pub fn into_inner(self) -> BytesMut {
        self.buf
    }

    /// Truncate to zero length and rewind, keeping the allocation.
    #[inline]
    pub fn reset(&mut self) {
        self.buf.clear();
        self.offset = 0;
    }

    // === Writes ===

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        self.buf.put_u8(b);
    }

    #[inline]
    pub fn write_slice(&mut self, src: &[u8]) {
        self.buf.extend_from_slice(src);
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn encode_u8(&mut self, x: u8) {
        self.buf.put_u8(x);
    }

    #[inline]
    pub fn encode_i8(&mut self, x: i8) {
        self.buf.put_i8(x);
    }

    #[inline]
    pub fn encode_u16(&mut self, x: u16) {
        self.buf.put_u16_le(x);
    }

    #[inline]
    pub fn encode_i16(&mut self, x: i16) {
        self.buf.put_i16_le(x);
    }

    #[inline]
    pub fn encode_u32(&mut self, x: u32) {
        self.buf.put_u32_le(x);
    }

    #[inline]
    pub fn encode_i32(&mut self, x: i32) {
        self.buf.put_i32_le(x);
    }

    #[inline]
    pub fn encode_u64(&mut self, x: u64) {
        self.buf.put_u64_le(x);
    }

    #[inline]
    pub fn encode_i64(&mut self, x: i64) {
        self.buf.put_i64_le(x);
    }

    /// Append `x` as a LEB128 varint.
    #[inline]
    pub fn encode_uvarint(&mut self, x: u64) {
        let mut scratch = [0u8; MAX_VARINT_LEN];
        let n = varint::encode_uvarint(x, &mut scratch);
        self.buf.extend_from_slice(&scratch[..n]);
    }

    /// Append `x` zigzag-transformed, then as a LEB128 varint.
    #[inline]
    pub fn encode_varint(&mut self, x: i64) {
        self.encode_uvarint(varint::zigzag_encode(x));
    }

    /// Append a varint length followed by the raw bytes.
    pub fn encode_bytes(&mut self, p: &[u8]) {
        self.buf.reserve(varint::uvarint_len(p.len() as u64) + p.len());
        self.encode_uvarint(p.len() as u64);
        self.buf.extend_from_slice(p);
    }

    /// Append a varint length followed by the UTF-8 bytes of `s`.
    pub fn encode_str(&mut self, s: &str) {
        self.encode_bytes(s.as_bytes());
    }

    // === Reads ===

    pub fn read_byte(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let b = self.buf[self.offset];
        self.offset += 1;
        Ok(b)
    }

    pub fn decode_u8(&mut self) -> Result<u8> {
        self.read_byte()
    }

    pub fn decode_i8(&mut self) -> Result<i8> {
        Ok(self.read_byte()? as i8)
    }

    pub fn decode_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    pub fn decode_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take()?))
    }

    pub fn decode_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    pub fn decode_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    pub fn decode_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    pub fn decode_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take()?))
    }

    pub fn decode_uvarint(&mut self) -> Result<u64> {
        let (value, n) = varint::decode_uvarint(self.remaining())?;
        self.offset += n;
        Ok(value)
    }

    pub fn decode_varint(&mut self) -> Result<i64> {
        self.decode_uvarint().map(varint::zigzag_decode)
    }

    /// Decode a length-prefixed blob into freshly allocated storage.
    pub fn decode_bytes(&mut self) -> Result<Vec<u8>> {
        self.decode_bytes_view().map(<[u8]>::to_vec)
    }

    /// Decode a length-prefixed blob as a view into this cursor's storage.
    ///
    /// The view borrows the cursor, so the storage cannot be written, grown,
    /// or reset while it is alive. Copy with [`decode_bytes`](Self::decode_bytes)
    /// when the bytes must outlive the next mutation.
    pub fn decode_bytes_view(&mut self) -> Result<&[u8]> {
        let (start, end) = self.blob_bounds()?;
        self.offset = end;
        Ok(&self.buf[start..end])
    }

    /// Decode a length-prefixed string into an owned `String`.
    pub fn decode_string(&mut self) -> Result<String> {
        self.decode_str_view().map(str::to_owned)
    }

    /// Decode a length-prefixed string as a view into this cursor's storage.
    pub fn decode_str_view(&mut self) -> Result<&str> {
        let (start, end) = self.blob_bounds()?;
        let s = std::str::from_utf8(&self.buf[start..end]).map_err(|_| Error::InvalidUtf8)?;
        self.offset = end;
        Ok(s)
    }

    /// Locate the payload of the length-prefixed blob at the offset without
    /// consuming anything.
    fn blob_bounds(&self) -> Result<(usize, usize)> {
        let (len, prefix) = varint::decode_uvarint(self.remaining())?;
        let available = self.len() - prefix;
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        if len > available {
            return Err(Error::Underflow {
                needed: prefix.saturating_add(len),
                remaining: self.len(),
            });
        }
        let start = self.offset + prefix;
        Ok((start, start + len))
    }

    #[inline]
    fn ensure(&self, n: usize) -> Result<()> {
        let remaining = self.len();
        if n > remaining {
            return Err(Error::Underflow {
                needed: n,
                remaining,
            });
        }
        Ok(())
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.offset..self.offset + N]);
        self.offset += N;
        Ok(out)
    }
}

impl From<BytesMut> for BufferCursor {
    fn from(buf: BytesMut) -> Self {
        Self::from_bytes(buf)
    }
}

impl From<Vec<u8>> for BufferCursor {
    fn from(v: Vec<u8>) -> Self {
        Self::from_bytes(BytesMut::from(&v[..]))
    }
}

impl From<&[u8]> for BufferCursor {
    fn from(s: &[u8]) -> Self {
        Self::from_bytes(BytesMut::from(s))
    }
}

impl io::Read for BufferCursor {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let src = self.remaining();
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
        self.offset += n;
        Ok(n)
    }
}

impl io::Write for BufferCursor {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(src);
        Ok(src.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
