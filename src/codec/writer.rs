//! Encoding onto a byte channel.
//!
//! Mirrors [`StreamReader`](super::StreamReader): big-endian fixed-width
//! integers, LEB128 varints, varint-prefixed blobs, and a pinned first error.

use std::io::{self, Write};

use tracing::debug;

use crate::codec::channel::ByteWrite;
use crate::codec::varint::{self, MAX_VARINT_LEN};
use crate::error::{Error, Result};

/// Primitive encoder over a [`ByteWrite`] channel.
///
/// Once a write fails, every later call returns that error and nothing more
/// reaches the channel.
#[derive(Debug)]
pub struct StreamWriter<W> {
    inner: W,
    err: Option<Error>,
}

impl<W: ByteWrite> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, err: None }
    }

    /// The pinned error, if the writer has faulted.
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_byte(&mut self, b: u8) -> Result<()> {
        self.check()?;
        let res = self.inner.write_byte(b).map_err(Error::from);
        self.track(res)
    }

    pub fn write_slice(&mut self, src: &[u8]) -> Result<()> {
        self.check()?;
        let res = self.inner.write_all(src).map_err(Error::from);
        self.track(res)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.check()?;
        let res = self.inner.flush().map_err(Error::from);
        self.track(res)
    }

    pub fn encode_u8(&mut self, x: u8) -> Result<()> {
        self.write_byte(x)
    }

    pub fn encode_i8(&mut self, x: i8) -> Result<()> {
        self.write_byte(x as u8)
    }

    pub fn encode_u16(&mut self, x: u16) -> Result<()> {
        self.write_slice(&x.to_be_bytes())
    }

    pub fn encode_i16(&mut self, x: i16) -> Result<()> {
        self.write_slice(&x.to_be_bytes())
    }

    pub fn encode_u32(&mut self, x: u32) -> Result<()> {
        self.write_slice(&x.to_be_bytes())
    }

    pub fn encode_i32(&mut self, x: i32) -> Result<()> {
        self.write_slice(&x.to_be_bytes())
    }

    pub fn encode_u64(&mut self, x: u64) -> Result<()> {
        self.write_slice(&x.to_be_bytes())
    }

    pub fn encode_i64(&mut self, x: i64) -> Result<()> {
        self.write_slice(&x.to_be_bytes())
    }

    /// Write `x` as a LEB128 varint, returning the bytes written.
    pub fn encode_uvarint(&mut self, x: u64) -> Result<usize> {
        let mut scratch = [0u8; MAX_VARINT_LEN];
        let n = varint::encode_uvarint(x, &mut scratch);
        self.write_slice(&scratch[..n])?;
        Ok(n)
    }

    /// Write `x` zigzag-transformed as a LEB128 varint, returning the bytes written.
    pub fn encode_varint(&mut self, x: i64) -> Result<usize> {
        self.encode_uvarint(varint::zigzag_encode(x))
    }

    /// Write a varint length and the raw bytes, returning the total written.
    pub fn encode_bytes(&mut self, p: &[u8]) -> Result<usize> {
        let n = self.encode_uvarint(p.len() as u64)?;
        self.write_slice(p)?;
        Ok(n + p.len())
    }

    pub fn encode_str(&mut self, s: &str) -> Result<usize> {
        self.encode_bytes(s.as_bytes())
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
        debug!("Stream writer faulted: {}", err);
        self.err = Some(err.clone());
        err
    }
}

impl<W: ByteWrite> Write for StreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check()?;
        match self.inner.write(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(e),
            Err(e) => Err(self.fail(e.into()).into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        StreamWriter::flush(self).map_err(io::Error::from)
    }
}

impl<W: ByteWrite> ByteWrite for StreamWriter<W> {
    fn write_byte(&mut self, b: u8) -> io::Result<()> {
        StreamWriter::write_byte(self, b).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::StreamReader;

    /// Accepts `budget` bytes, fails once, then accepts everything.
    struct LimitedWriter {
        out: Vec<u8>,
        budget: usize,
    }

    impl Write for LimitedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                self.budget = usize::MAX;
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            let n = buf.len().min(self.budget);
            self.out.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl ByteWrite for LimitedWriter {}

    #[test]
    fn test_fixed_width_is_big_endian() {
        let mut w = StreamWriter::new(Vec::new());
        w.encode_u16(0x0102).unwrap();
        w.encode_i32(-2).unwrap();
        assert_eq!(w.into_inner(), vec![0x01, 0x02, 0xff, 0xff, 0xff, 0xfe]);
    }

    #[test]
    fn test_varint_byte_counts() {
        let mut w = StreamWriter::new(Vec::new());
        assert_eq!(w.encode_uvarint(300).unwrap(), 2);
        assert_eq!(w.encode_varint(-2).unwrap(), 1);
        assert_eq!(w.encode_str("hi").unwrap(), 3);
        assert_eq!(w.get_ref(), &vec![0xac, 0x02, 0x03, 0x02, b'h', b'i']);
    }

    #[test]
    fn test_roundtrip_through_reader() {
        let mut w = StreamWriter::new(Vec::new());
        w.encode_u8(7).unwrap();
        w.encode_i16(i16::MIN).unwrap();
        w.encode_u32(u32::MAX).unwrap();
        w.encode_i64(i64::MIN).unwrap();
        w.encode_varint(i64::MAX).unwrap();
        w.encode_bytes(b"").unwrap();
        w.encode_str("payload").unwrap();
        let out = w.into_inner();

        let mut r = StreamReader::new(&out[..]);
        assert_eq!(r.decode_u8().unwrap(), 7);
        assert_eq!(r.decode_i16().unwrap(), i16::MIN);
        assert_eq!(r.decode_u32().unwrap(), u32::MAX);
        assert_eq!(r.decode_i64().unwrap(), i64::MIN);
        assert_eq!(r.decode_varint().unwrap(), i64::MAX);
        assert!(r.decode_bytes().unwrap().is_empty());
        assert_eq!(r.decode_string().unwrap(), "payload");
    }

    #[test]
    fn test_roundtrip_extremes() {
        let mut w = StreamWriter::new(Vec::new());
        for x in [0, 1, u8::MAX] {
            w.encode_u8(x).unwrap();
        }
        for x in [i8::MIN, -1, 0, 1, i8::MAX] {
            w.encode_i8(x).unwrap();
        }
        for x in [0, 1, u16::MAX] {
            w.encode_u16(x).unwrap();
        }
        for x in [i16::MIN, -1, 0, 1, i16::MAX] {
            w.encode_i16(x).unwrap();
        }
        for x in [0, 1, u32::MAX] {
            w.encode_u32(x).unwrap();
        }
        for x in [i32::MIN, -1, 0, 1, i32::MAX] {
            w.encode_i32(x).unwrap();
        }
        for x in [0, 1, u64::MAX] {
            w.encode_u64(x).unwrap();
        }
        for x in [i64::MIN, -1, 0, 1, i64::MAX] {
            w.encode_i64(x).unwrap();
        }
        for x in [0, 1, u64::MAX] {
            w.encode_uvarint(x).unwrap();
        }
        for x in [i64::MIN, -1, 0, 1, i64::MAX] {
            w.encode_varint(x).unwrap();
        }
        let out = w.into_inner();

        let mut r = StreamReader::new(&out[..]);
        for x in [0, 1, u8::MAX] {
            assert_eq!(r.decode_u8().unwrap(), x);
        }
        for x in [i8::MIN, -1, 0, 1, i8::MAX] {
            assert_eq!(r.decode_i8().unwrap(), x);
        }
        for x in [0, 1, u16::MAX] {
            assert_eq!(r.decode_u16().unwrap(), x);
        }
        for x in [i16::MIN, -1, 0, 1, i16::MAX] {
            assert_eq!(r.decode_i16().unwrap(), x);
        }
        for x in [0, 1, u32::MAX] {
            assert_eq!(r.decode_u32().unwrap(), x);
        }
        for x in [i32::MIN, -1, 0, 1, i32::MAX] {
            assert_eq!(r.decode_i32().unwrap(), x);
        }
        for x in [0, 1, u64::MAX] {
            assert_eq!(r.decode_u64().unwrap(), x);
        }
        for x in [i64::MIN, -1, 0, 1, i64::MAX] {
            assert_eq!(r.decode_i64().unwrap(), x);
        }
        for x in [0, 1, u64::MAX] {
            assert_eq!(r.decode_uvarint().unwrap(), x);
        }
        for x in [i64::MIN, -1, 0, 1, i64::MAX] {
            assert_eq!(r.decode_varint().unwrap(), x);
        }
        assert!(matches!(r.decode_u8(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_write_error_is_sticky() {
        let mut w = StreamWriter::new(LimitedWriter {
            out: Vec::new(),
            budget: 2,
        });
        w.encode_u16(0xabcd).unwrap();
        assert!(matches!(w.encode_u8(1), Err(Error::Io(_))));
        assert!(w.error().is_some());

        // The channel would accept more now, but the writer stays faulted.
        assert!(matches!(w.encode_u8(1), Err(Error::Io(_))));
        assert!(w.write(b"x").is_err());
        assert!(w.flush().is_err());
        assert_eq!(w.get_ref().out, vec![0xab, 0xcd]);
    }

    #[test]
    fn test_cursor_as_channel() {
        let mut w = StreamWriter::new(crate::codec::BufferCursor::new());
        w.encode_u32(1).unwrap();
        let cur = w.into_inner();
        assert_eq!(cur.as_slice(), &[0, 0, 0, 1]);
    }
}
