//! Decoding from a byte channel.
//!
//! Fixed-width integers are big-endian here, unlike the little-endian
//! [`BufferCursor`](super::BufferCursor). Varints and length-prefixed blobs
//! use the same bytes in both.

use std::io::{self, Read};

use tracing::debug;

use crate::codec::channel::ByteRead;
use crate::codec::varint::{self, UvarintDecoder};
use crate::error::{Error, Result};

/// Largest blob [`StreamReader::decode_bytes`] accepts by default.
pub const DEFAULT_MAX_BYTES_LEN: usize = (1 << 16) - 1;

/// Primitive decoder over a [`ByteRead`] channel.
///
/// The first failure, whether raised by the channel or by malformed input,
/// is pinned: every later call returns a clone of it without touching the
/// channel. A faulted reader must be discarded.
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: R,
    err: Option<Error>,
    max_bytes_len: usize,
}

impl<R: ByteRead> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            err: None,
            max_bytes_len: DEFAULT_MAX_BYTES_LEN,
        }
    }

    /// Change the ceiling on declared blob lengths accepted by
    /// [`decode_bytes`](Self::decode_bytes) and [`decode_string`](Self::decode_string).
    pub fn with_max_bytes_len(mut self, max: usize) -> Self {
        self.max_bytes_len = max;
        self
    }

    /// The pinned error, if the reader has faulted.
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.check()?;
        let res = self.inner.read_byte().map_err(Error::from);
        self.track(res)
    }

    /// Read into `buf` until at least `min` bytes have arrived.
    ///
    /// Fails with [`Error::UnexpectedEof`] if the channel ends first and with
    /// [`Error::LengthTooLarge`] if `buf` cannot hold `min` bytes.
    pub fn read_at_least(&mut self, buf: &mut [u8], min: usize) -> Result<usize> {
        self.check()?;
        if buf.len() < min {
            return Err(self.fail(Error::LengthTooLarge {
                len: min as u64,
                max: buf.len(),
            }));
        }
        let mut n = 0;
        while n < min {
            match self.inner.read(&mut buf[n..]) {
                Ok(0) => return Err(self.fail(Error::UnexpectedEof)),
                Ok(read) => n += read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.fail(e.into())),
            }
        }
        Ok(n)
    }

    pub fn decode_u8(&mut self) -> Result<u8> {
        self.read_byte()
    }

    pub fn decode_i8(&mut self) -> Result<i8> {
        Ok(self.read_byte()? as i8)
    }

    pub fn decode_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn decode_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn decode_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn decode_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn decode_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn decode_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn decode_uvarint(&mut self) -> Result<u64> {
        let mut decoder = UvarintDecoder::new();
        loop {
            let byte = self.read_byte()?;
            match decoder.push(byte) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(e) => return Err(self.fail(e)),
            }
        }
    }

    pub fn decode_varint(&mut self) -> Result<i64> {
        self.decode_uvarint().map(varint::zigzag_decode)
    }

    /// Decode a length-prefixed blob into caller-supplied storage, returning
    /// the payload length.
    ///
    /// The declared length is bounded by `dst.len()` rather than by the
    /// reader's blob ceiling.
    pub fn decode_bytes_into(&mut self, dst: &mut [u8]) -> Result<usize> {
        let len = self.decode_uvarint()?;
        let n = match usize::try_from(len) {
            Ok(n) if n <= dst.len() => n,
            _ => {
                return Err(self.fail(Error::LengthTooLarge {
                    len,
                    max: dst.len(),
                }))
            }
        };
        self.read_at_least(&mut dst[..n], n)
    }

    /// Decode a length-prefixed blob into freshly allocated storage.
    ///
    /// A declared length above the configured ceiling is rejected before
    /// anything is allocated.
    pub fn decode_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.decode_uvarint()?;
        let n = match usize::try_from(len) {
            Ok(n) if n <= self.max_bytes_len => n,
            _ => {
                let max = self.max_bytes_len;
                return Err(self.fail(Error::LengthTooLarge { len, max }));
            }
        };
        let mut p = vec![0u8; n];
        self.read_at_least(&mut p, n)?;
        Ok(p)
    }

    pub fn decode_string(&mut self) -> Result<String> {
        let p = self.decode_bytes()?;
        String::from_utf8(p).map_err(|_| self.fail(Error::InvalidUtf8))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_at_least(&mut out, N)?;
        Ok(out)
    }

    #[inline]
    fn check(&self) -> Result<()> {
        match &self.err {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    #[inline]
    fn track<T>(&mut self, res: Result<T>) -> Result<T> {
        res.map_err(|e| self.fail(e))
    }

    fn fail(&mut self, err: Error) -> Error {
        debug!("Stream reader faulted: {}", err);
        self.err = Some(err.clone());
        err
    }
}

/// Raw reads share the pinned error. `Interrupted` is passed through without
/// being pinned.
impl<R: ByteRead> Read for StreamReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check()?;
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => Err(self.fail(e.into()).into()),
        }
    }
}

impl<R: ByteRead> ByteRead for StreamReader<R> {
    fn read_byte(&mut self) -> io::Result<u8> {
        StreamReader::read_byte(self).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields its bytes, then fails every read.
    struct FlakyReader {
        data: Vec<u8>,
        pos: usize,
        reads: usize,
    }

    impl Read for FlakyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            if self.pos == self.data.len() {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    impl ByteRead for FlakyReader {}

    #[test]
    fn test_fixed_width_is_big_endian() {
        let src: &[u8] = &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut r = StreamReader::new(src);
        assert_eq!(r.decode_u16().unwrap(), 0x0102);
        assert_eq!(r.decode_u32().unwrap(), 0x0304_0506);
    }

    #[test]
    fn test_decode_i32_uses_four_bytes() {
        let bytes = (-70_000i32).to_be_bytes();
        let mut r = StreamReader::new(&bytes[..]);
        assert_eq!(r.decode_i32().unwrap(), -70_000);
        assert!(r.get_ref().is_empty());
    }

    #[test]
    fn test_varints() {
        let src: &[u8] = &[0xac, 0x02, 0x03];
        let mut r = StreamReader::new(src);
        assert_eq!(r.decode_uvarint().unwrap(), 300);
        assert_eq!(r.decode_varint().unwrap(), -2);
    }

    #[test]
    fn test_eof_is_sticky() {
        let src: &[u8] = &[0x01];
        let mut r = StreamReader::new(src);
        assert!(matches!(r.decode_u16(), Err(Error::UnexpectedEof)));
        assert!(matches!(r.error(), Some(Error::UnexpectedEof)));
        assert!(matches!(r.decode_u8(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_channel_error_is_sticky() {
        let mut r = StreamReader::new(FlakyReader {
            data: vec![0x2a],
            pos: 0,
            reads: 0,
        });
        assert_eq!(r.decode_u8().unwrap(), 0x2a);
        let first = r.decode_u8().unwrap_err();
        assert!(matches!(first, Error::Io(_)));
        let reads = r.get_ref().reads;

        // Later calls return the pinned error without touching the channel.
        assert!(matches!(r.decode_u64(), Err(Error::Io(_))));
        let mut raw = [0u8; 4];
        assert!(r.read(&mut raw).is_err());
        assert_eq!(r.get_ref().reads, reads);
    }

    #[test]
    fn test_overflowing_varint_is_sticky() {
        let mut src = vec![0xff; 10];
        src.push(0x01);
        let mut r = StreamReader::new(&src[..]);
        assert!(matches!(r.decode_uvarint(), Err(Error::VarintOverflow)));
        assert!(matches!(r.decode_u8(), Err(Error::VarintOverflow)));
    }

    #[test]
    fn test_large_blob_rejected() {
        let mut src = Vec::new();
        let mut scratch = [0u8; varint::MAX_VARINT_LEN];
        let n = varint::encode_uvarint(DEFAULT_MAX_BYTES_LEN as u64 + 1, &mut scratch);
        src.extend_from_slice(&scratch[..n]);
        let mut r = StreamReader::new(&src[..]);
        assert!(matches!(
            r.decode_bytes(),
            Err(Error::LengthTooLarge {
                len: 65536,
                max: DEFAULT_MAX_BYTES_LEN
            })
        ));
        assert!(r.error().is_some());
    }

    #[test]
    fn test_custom_blob_ceiling() {
        let src: &[u8] = &[0x03, b'a', b'b', b'c'];
        let mut r = StreamReader::new(src).with_max_bytes_len(2);
        assert!(matches!(r.decode_bytes(), Err(Error::LengthTooLarge { len: 3, max: 2 })));

        let mut r = StreamReader::new(src).with_max_bytes_len(3);
        assert_eq!(r.decode_string().unwrap(), "abc");
    }

    #[test]
    fn test_decode_bytes_into() {
        let src: &[u8] = &[0x02, 0xde, 0xad, 0x02, 0xbe, 0xef];
        let mut r = StreamReader::new(src);
        let mut dst = [0u8; 4];
        assert_eq!(r.decode_bytes_into(&mut dst).unwrap(), 2);
        assert_eq!(&dst[..2], &[0xde, 0xad]);

        let mut small = [0u8; 1];
        assert!(matches!(
            r.decode_bytes_into(&mut small),
            Err(Error::LengthTooLarge { len: 2, max: 1 })
        ));
    }

    #[test]
    fn test_truncated_blob() {
        let src: &[u8] = &[0x05, b'a', b'b'];
        let mut r = StreamReader::new(src);
        assert!(matches!(r.decode_bytes(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_nested_reader_shares_fault() {
        let src: &[u8] = &[0x01];
        let mut outer = StreamReader::new(StreamReader::new(src));
        assert_eq!(outer.decode_u8().unwrap(), 1);
        assert!(matches!(outer.decode_u8(), Err(Error::UnexpectedEof)));
        assert!(outer.get_ref().error().is_some());
    }

    #[test]
    fn test_empty_blob() {
        let src: &[u8] = &[0x00];
        let mut r = StreamReader::new(src);
        assert_eq!(r.decode_bytes().unwrap(), Vec::<u8>::new());
    }
}
