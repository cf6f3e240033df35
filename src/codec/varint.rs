//! LEB128 varints and the zigzag transform.
//!
//! Shared by [`BufferCursor`](super::BufferCursor) and the stream codecs so
//! both produce identical varint bytes regardless of fixed-width byte order.

use crate::error::{Error, Result};

/// Longest encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Encode `x` into `out`, returning the number of bytes used.
#[inline]
pub fn encode_uvarint(mut x: u64, out: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    while x >= 0x80 {
        out[i] = (x as u8 & 0x7f) | 0x80;
        x >>= 7;
        i += 1;
    }
    out[i] = x as u8;
    i + 1
}

/// Number of bytes `encode_uvarint` produces for `x`.
#[inline]
pub const fn uvarint_len(x: u64) -> usize {
    let bits = 64 - (x | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Map signed to unsigned so small magnitudes stay small: 0, -1, 1, -2 ... -> 0, 1, 2, 3 ...
#[inline]
pub const fn zigzag_encode(x: i64) -> u64 {
    ((x << 1) ^ (x >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub const fn zigzag_decode(ux: u64) -> i64 {
    ((ux >> 1) as i64) ^ -((ux & 1) as i64)
}

/// Byte-at-a-time LEB128 decoder.
///
/// Feed bytes with [`push`](Self::push) until it yields a value. Rejects
/// sequences longer than ten bytes and a tenth byte carrying more than the
/// single remaining bit.
#[derive(Debug, Default, Clone, Copy)]
pub struct UvarintDecoder {
    value: u64,
    shift: u32,
    count: usize,
}

impl UvarintDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next byte. Returns `Some(value)` once the terminating byte arrives.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<Option<u64>> {
        if self.count == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(Error::VarintOverflow);
        }
        self.count += 1;
        if byte < 0x80 {
            return Ok(Some(self.value | (byte as u64) << self.shift));
        }
        self.value |= ((byte & 0x7f) as u64) << self.shift;
        self.shift += 7;
        Ok(None)
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.count
    }
}

/// Decode one varint from the front of `buf`.
///
/// Returns the value and the number of bytes it occupied. An unterminated
/// sequence fails with [`Error::Underflow`].
pub fn decode_uvarint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut decoder = UvarintDecoder::new();
    for &byte in buf {
        if let Some(value) = decoder.push(byte)? {
            return Ok((value, decoder.consumed()));
        }
    }
    Err(Error::Underflow {
        needed: decoder.consumed() + 1,
        remaining: buf.len(),
    })
}
